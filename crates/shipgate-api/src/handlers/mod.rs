//! Request handlers, one module per surface.

pub mod audit;
pub mod grant;
pub mod health;
pub mod portal;
