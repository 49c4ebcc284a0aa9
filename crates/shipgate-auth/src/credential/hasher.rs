//! Argon2id hashing and verification of credential secrets.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use shipgate_core::config::Argon2Config;
use shipgate_core::error::AppError;

/// Hashes and verifies raw bearer secrets with Argon2id.
///
/// Digests are self-describing PHC strings, so verification always uses the
/// parameters a secret was hashed with, even after the configured cost
/// changes.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Create a hasher with the configured cost parameters.
    pub fn new(config: &Argon2Config) -> Result<Self, AppError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a secret with a fresh random salt.
    pub fn hash_secret(&self, secret: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Secret hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verify a secret against a stored digest.
    ///
    /// A digest that does not parse never matches; it is reported as a
    /// non-match rather than an error so one corrupt row cannot break
    /// authentication for every other credential.
    pub fn verify_secret(&self, secret: &str, digest: &str) -> Result<bool, AppError> {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return Ok(false);
        };
        match self.argon2().verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Secret verification failed: {e}"
            ))),
        }
    }
}
