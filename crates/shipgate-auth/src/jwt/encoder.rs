//! Staff token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use shipgate_core::config::AuthConfig;
use shipgate_core::error::AppError;
use shipgate_core::types::{TenantId, UserId};

use super::claims::StaffClaims;

/// Signs staff tokens (HS256).
///
/// The surrounding identity system normally mints these; the encoder exists
/// for the operator CLI and tests.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtEncoder {
    /// Create an encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_minutes: config.staff_token_ttl_minutes as i64,
        }
    }

    /// Issue a token for a staff user acting within a tenant.
    pub fn issue(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
        name: Option<&str>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.ttl_minutes);
        let claims = StaffClaims {
            sub: user_id,
            tenant_id,
            name: name.map(str::to_string),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode staff token: {e}")))?;
        Ok((token, exp))
    }
}
