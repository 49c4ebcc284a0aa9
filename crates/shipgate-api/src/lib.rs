//! # shipgate-api
//!
//! HTTP API layer for Shipgate built on Axum.
//!
//! Provides the external portal endpoints, staff grant management, health
//! checks, extractors for both kinds of caller, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::{AppState, Stores};
