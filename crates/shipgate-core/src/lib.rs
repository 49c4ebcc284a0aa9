//! # shipgate-core
//!
//! Core crate for Shipgate. Contains configuration schemas, typed
//! identifiers, the tenant scope handle, pagination types, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other Shipgate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
