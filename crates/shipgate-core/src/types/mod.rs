//! Core type definitions used across the Shipgate workspace.

pub mod id;
pub mod pagination;
pub mod tenant;

pub use id::*;
pub use pagination::{PageRequest, PageResponse};
pub use tenant::TenantScope;
