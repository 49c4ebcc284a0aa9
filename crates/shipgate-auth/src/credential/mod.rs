//! External credential secrets and authentication.

pub mod authenticator;
pub mod hasher;
pub mod token;

pub use authenticator::{AuthenticatedAgent, CredentialAuthenticator};
pub use hasher::CredentialHasher;
pub use token::{IssuedToken, ParsedToken, TokenGenerator};
