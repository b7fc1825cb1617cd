use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::AuthClaims;
use crate::shared::AppError;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Creates a token for the given username with the configured lifetime
    pub fn create_token(&self, username: &str) -> Result<String, AppError> {
        self.create_token_with_ttl(username, self.ttl)
    }

    /// Creates a token with an explicit lifetime; zero or negative yields an already-expired token
    #[instrument(skip(self, username))]
    pub fn create_token_with_ttl(&self, username: &str, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + ttl).timestamp();

        debug!(
            ttl_seconds = ttl.num_seconds(),
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = AuthClaims {
            sub: username.to_string(),
            exp,
            iat: now.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Validates signature and expiry and returns the claims
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<AuthClaims, AppError> {
        debug!("Decoding and validating JWT token");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<AuthClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::Unauthorized("Could not validate credentials".to_string())
        })?;

        // A token expiring this very second is already stale
        if claims.exp <= Utc::now().timestamp() {
            debug!(exp = claims.exp, "JWT token has expired");
            return Err(AppError::Unauthorized("Token has expired".to_string()));
        }

        debug!(username = %claims.sub, exp = claims.exp, "JWT token decoded successfully");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate_token() {
        let config = TokenConfig::new("secret", 30);

        let token = config.create_token("alice_emp").unwrap();
        assert!(!token.is_empty());
        assert_eq!(token.matches('.').count(), 2);

        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "alice_emp");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_invalid_token() {
        let config = TokenConfig::new("secret", 30);
        let result = config.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_token_with_different_secret() {
        let issuer = TokenConfig::new("secret-one", 30);
        let verifier = TokenConfig::new("secret-two", 30);

        let token = issuer.create_token("alice_emp").unwrap();

        assert!(issuer.validate_token(&token).is_ok());
        assert!(matches!(
            verifier.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_zero_ttl_token_is_expired() {
        let config = TokenConfig::new("secret", 0);
        let token = config.create_token("alice_emp").unwrap();
        assert!(matches!(
            config.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_past_expiry_token_is_expired() {
        let config = TokenConfig::new("secret", 30);
        let token = config
            .create_token_with_ttl("alice_emp", Duration::minutes(-5))
            .unwrap();
        assert!(matches!(
            config.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }
}
