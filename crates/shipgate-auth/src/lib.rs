//! # shipgate-auth
//!
//! Authentication for Shipgate.
//!
//! ## Modules
//!
//! - `credential` — Argon2id secret hashing, bearer token generation and
//!   parsing, and the external credential authenticator
//! - `tenant` — binding an authenticated caller to its tenant scope
//! - `jwt` — staff tokens for internal grant management

pub mod credential;
pub mod jwt;
pub mod tenant;

pub use credential::{
    AuthenticatedAgent, CredentialAuthenticator, CredentialHasher, IssuedToken, TokenGenerator,
};
pub use jwt::{JwtDecoder, JwtEncoder, StaffClaims};
pub use tenant::TenantContextBinder;
