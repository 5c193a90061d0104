//! JWT bearer-token validation using RS256.
//!
//! Tokens are issued by the external identity provider; this backend only
//! validates them and extracts the identity claims (user id, role, student
//! code). Token generation is kept for integration tests and local tooling.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// JWT token claims supplied by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Account role (admin, student, teacher, staff)
    pub role: String,
    /// Student code claim, present only for student accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_code: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Configuration for JWT token validation (and generation in tests/tooling).
///
/// The private key is optional: deployments that only validate tokens leave
/// it empty and `generate_token` fails.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    /// Token expiration in seconds applied when generating tokens
    pub token_expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
    algorithm: Algorithm,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a new JwtConfig from an RSA key pair in PEM format.
    pub fn new(
        private_key_pem: &str,
        public_key_pem: &str,
        token_expiry_secs: i64,
    ) -> Result<Self, JwtError> {
        Self::with_leeway(
            private_key_pem,
            public_key_pem,
            token_expiry_secs,
            DEFAULT_LEEWAY_SECS,
        )
    }

    /// Creates a new JwtConfig with a custom clock-skew leeway.
    ///
    /// An empty private key yields a validation-only configuration.
    pub fn with_leeway(
        private_key_pem: &str,
        public_key_pem: &str,
        token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let encoding_key = if private_key_pem.is_empty() {
            None
        } else {
            Some(
                EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
                    .map_err(|e| JwtError::InvalidKey(format!("Invalid private key: {}", e)))?,
            )
        };

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            token_expiry_secs,
            leeway_secs,
            algorithm: Algorithm::RS256,
        })
    }

    /// Creates a JwtConfig for testing with an HS256 symmetric key.
    /// DO NOT use in production - only for tests.
    pub fn new_for_testing(secret: &str) -> Self {
        Self {
            encoding_key: Some(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_secs: 3600,
            leeway_secs: 0,
            algorithm: Algorithm::HS256,
        }
    }

    /// Generates a signed token carrying the given identity claims.
    ///
    /// Returns the encoded token and its jti.
    pub fn generate_token(
        &self,
        user_id: Uuid,
        role: &str,
        student_code: Option<&str>,
    ) -> Result<(String, String), JwtError> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| JwtError::EncodingError("No signing key configured".to_string()))?;

        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let exp = (now + Duration::seconds(self.token_expiry_secs)).timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            student_code: student_code.map(|c| c.to_string()),
            exp,
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let header = Header::new(self.algorithm);
        let token =
            encode(&header, &claims, encoding_key).map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, jti))
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::new_for_testing("test-secret-key")
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let (token, jti) = config
            .generate_token(user_id, "student", Some("SV001234"))
            .unwrap();
        let claims = config.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "student");
        assert_eq!(claims.student_code.as_deref(), Some("SV001234"));
        assert_eq!(claims.jti, jti);
    }

    #[test]
    fn test_token_without_student_code() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let (token, _) = config.generate_token(user_id, "staff", None).unwrap();
        let claims = config.validate_token(&token).unwrap();

        assert_eq!(claims.role, "staff");
        assert!(claims.student_code.is_none());
    }

    #[test]
    fn test_validate_garbage_token() {
        let config = test_config();
        let result = config.validate_token("not.a.token");
        assert!(matches!(
            result,
            Err(JwtError::InvalidToken) | Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let config = test_config();
        let other = JwtConfig::new_for_testing("different-secret");

        let (token, _) = config
            .generate_token(Uuid::new_v4(), "student", None)
            .unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut config = test_config();
        config.token_expiry_secs = -60;

        let (token, _) = config
            .generate_token(Uuid::new_v4(), "student", None)
            .unwrap();
        let result = config.validate_token(&token);
        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_jwt_config_debug_redacts_keys() {
        let config = test_config();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-secret-key"));
    }

    #[test]
    fn test_invalid_pem_rejected() {
        let result = JwtConfig::new("not a pem", "also not a pem", 3600);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_validation_only_config_rejects_generation() {
        let hs = test_config();
        let config = JwtConfig {
            encoding_key: None,
            decoding_key: hs.decoding_key.clone(),
            token_expiry_secs: 3600,
            leeway_secs: 0,
            algorithm: Algorithm::HS256,
        };

        let result = config.generate_token(Uuid::new_v4(), "student", None);
        assert!(matches!(result, Err(JwtError::EncodingError(_))));

        // Still validates tokens minted elsewhere with the same key
        let (token, _) = hs.generate_token(Uuid::new_v4(), "student", None).unwrap();
        assert!(config.validate_token(&token).is_ok());
    }
}
