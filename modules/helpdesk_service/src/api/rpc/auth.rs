//! Bearer token verification
//!
//! Access tokens are HS256 JWTs issued by the auth service. The `sub` claim
//! is the auth identity id, which is also the caller's profile id.

use crate::contract::{HelpdeskError, SecurityContext};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims read from an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Verifies `Authorization` header values and builds the caller's context
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a raw header value (`Bearer <token>`)
    pub fn verify_header(&self, header: Option<&str>) -> Result<SecurityContext, HelpdeskError> {
        let token = header
            .map(str::trim)
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| HelpdeskError::unauthorized("missing bearer token"))?;
        self.verify(token)
    }

    pub fn verify(&self, token: &str) -> Result<SecurityContext, HelpdeskError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            HelpdeskError::unauthorized("invalid bearer token")
        })?;
        Ok(SecurityContext::new(data.claims.sub, data.claims.email))
    }
}
