//! Shipment status lifecycle.

pub mod engine;

pub use engine::{StatusTransitionEngine, TransitionRejection};
