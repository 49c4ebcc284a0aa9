//! Grant (external credential) management for internal staff.

pub mod service;

pub use service::{CreateGrantRequest, GrantService, IssuedGrant};
