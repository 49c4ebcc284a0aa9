//! External access portal configuration.

use serde::{Deserialize, Serialize};

/// Settings governing external credentials and the portal surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Prefix prepended to every issued bearer token.
    #[serde(default = "default_token_prefix")]
    pub token_prefix: String,
    /// Public base URL of the portal front end; the token is appended as a
    /// query parameter when building the portal link.
    #[serde(default = "default_base_url")]
    pub public_base_url: String,
    /// Expiry applied when a grant request does not specify one.
    #[serde(default = "default_expiry_days")]
    pub default_expiry_days: u32,
    /// Upper bound on the expiry of a single grant.
    #[serde(default = "default_max_expiry_days")]
    pub max_expiry_days: u32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            token_prefix: default_token_prefix(),
            public_base_url: default_base_url(),
            default_expiry_days: default_expiry_days(),
            max_expiry_days: default_max_expiry_days(),
        }
    }
}

impl PortalConfig {
    /// Build the link handed to an external agent for a raw token.
    pub fn portal_url(&self, raw_token: &str) -> String {
        format!(
            "{}/portal?token={raw_token}",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

fn default_token_prefix() -> String {
    "ext_".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_expiry_days() -> u32 {
    30
}

fn default_max_expiry_days() -> u32 {
    365
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_url_trims_trailing_slash() {
        let config = PortalConfig {
            public_base_url: "https://portal.example.com/".to_string(),
            ..PortalConfig::default()
        };
        assert_eq!(
            config.portal_url("ext_abc.def"),
            "https://portal.example.com/portal?token=ext_abc.def"
        );
    }
}
