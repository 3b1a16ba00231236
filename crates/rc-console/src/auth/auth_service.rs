//! Authentication Service
//!
//! HS256 JWT validation for console operators. Tokens are minted by the
//! company SSO gateway; `generate_token` exists for local development and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::shared::error::{PlatformError, Result};

/// JWT Claims for operator tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (operator actor id)
    pub sub: String,

    pub iss: String,

    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub roles: Vec<String>,
}

/// Configuration for the auth service
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub issuer: String,
    pub audience: String,
    /// Lifetime of development tokens in seconds
    pub session_token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            issuer: "registry-console".to_string(),
            audience: "registry-console".to_string(),
            session_token_expiry_secs: 28800, // 8 hours
        }
    }
}

/// Authentication service for token validation
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        info!(issuer = %config.issuer, "AuthService initialized with HS256");

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mint a token for an operator
    pub fn generate_token(
        &self,
        actor_id: &str,
        name: &str,
        email: Option<&str>,
        roles: &[&str],
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.session_token_expiry_secs);

        let claims = AccessTokenClaims {
            sub: actor_id.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            email: email.map(String::from),
            name: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PlatformError::internal(format!("Failed to encode JWT: {}", e)))
    }

    /// Validate a token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                _ => PlatformError::InvalidToken { message: format!("{}", e) },
            })
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            secret_key: "test-secret".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = service();
        let token = service
            .generate_token("42", "Alice", Some("alice@example.com"), &["console:viewer"])
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
        assert_eq!(claims.roles, vec!["console:viewer".to_string()]);
    }

    #[test]
    fn test_rejects_foreign_audience() {
        let other = AuthService::new(AuthConfig {
            secret_key: "test-secret".to_string(),
            audience: "someone-else".to_string(),
            ..Default::default()
        });
        let token = other.generate_token("42", "Alice", None, &[]).unwrap();

        let err = service().validate_token(&token).unwrap_err();
        assert!(matches!(err, PlatformError::InvalidToken { .. }));
    }

    #[test]
    fn test_rejects_expired_token() {
        let expired = AuthService::new(AuthConfig {
            secret_key: "test-secret".to_string(),
            session_token_expiry_secs: -3600,
            ..Default::default()
        });
        let token = expired.generate_token("42", "Alice", None, &[]).unwrap();

        let err = service().validate_token(&token).unwrap_err();
        assert!(matches!(err, PlatformError::TokenExpired));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }
}
