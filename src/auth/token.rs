use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::types::CallerClaims;
use crate::shared::AppError;

const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 15;

/// HS256 signing and validation of caller tokens
#[derive(Clone)]
pub struct TokenConfig {
    secret: Arc<str>,
    pub lifetime: Duration,
}

impl TokenConfig {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret),
            lifetime: Duration::minutes(DEFAULT_TOKEN_LIFETIME_MINUTES),
        }
    }

    /// Mints a token for a caller; the front end does the same with the shared secret
    #[instrument(skip(self, username, roles))]
    pub fn create_token(
        &self,
        user_id: String,
        username: String,
        roles: Vec<String>,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = CallerClaims {
            sub: user_id,
            username,
            roles,
            exp: (now + self.lifetime).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(signing_error)
    }

    /// Validates signature and expiry, returning the caller's claims
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<CallerClaims, AppError> {
        decode::<CallerClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(user_id = %data.claims.sub, exp = data.claims.exp, "Caller token decoded");
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode caller token");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}

/// Signing only fails on a bad key or algorithm setup, never on caller input
fn signing_error(e: jsonwebtoken::errors::Error) -> AppError {
    error!(error = %e, "Failed to encode JWT token");
    AppError::Internal(format!("token signing failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_create_and_validate_token() {
        let config = TokenConfig::new("secret");
        let token = config
            .create_token("42".to_string(), "alice".to_string(), vec!["r1".to_string()])
            .unwrap();

        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.roles, vec!["r1"]);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_signing_failure_is_a_server_error() {
        let error = signing_error(jsonwebtoken::errors::ErrorKind::InvalidKeyFormat.into());
        assert!(matches!(error, AppError::Internal(_)));
        assert_eq!(
            error.into_response().status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_token() {
        let config = TokenConfig::new("secret");
        let result = config.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_token_with_different_secret() {
        let token = TokenConfig::new("one")
            .create_token("42".to_string(), "alice".to_string(), Vec::new())
            .unwrap();
        assert!(TokenConfig::new("two").validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let mut config = TokenConfig::new("secret");
        config.lifetime = Duration::minutes(-10);
        let token = config
            .create_token("42".to_string(), "alice".to_string(), Vec::new())
            .unwrap();
        assert!(config.validate_token(&token).is_err());
    }
}
