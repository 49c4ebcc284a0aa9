//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Staff token and credential hashing configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for verifying staff JWTs (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Lifetime of staff tokens minted by the CLI, in minutes.
    #[serde(default = "default_staff_ttl")]
    pub staff_token_ttl_minutes: u64,
    /// Argon2id cost parameters for external credential secrets.
    #[serde(default)]
    pub argon2: Argon2Config,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            staff_token_ttl_minutes: default_staff_ttl(),
            argon2: Argon2Config::default(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[redacted]")
            .field("staff_token_ttl_minutes", &self.staff_token_ttl_minutes)
            .field("argon2", &self.argon2)
            .finish()
    }
}

/// Argon2id cost parameters.
///
/// Defaults match the `argon2` crate's recommended parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argon2Config {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of iterations.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION_CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_staff_ttl() -> u64 {
    60
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
