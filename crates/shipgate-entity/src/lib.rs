//! # shipgate-entity
//!
//! Domain entity models for Shipgate. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`; the enumerations that form the field and status
//! vocabularies are closed so that capability sets can only name things
//! that exist.

pub mod audit;
pub mod credential;
pub mod shipment;
