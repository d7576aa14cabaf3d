// JWT token service
// HS256 access tokens carrying `{ id, rol, iat, exp, iss }`

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::app_config::AppConfig;
use crate::models::auth::Claims;
use crate::models::user::Rol;

// Error types for JWT operations
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(String),

    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtError::InvalidToken,
            _ => JwtError::EncodingError(err.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    pub expiry_seconds: u64,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub encoding_key: EncodingKey,
    pub decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("expiry_seconds", &self.expiry_seconds)
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("encoding_key", &"<redacted>")
            .field("decoding_key", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: &str, expiry_seconds: u64, issuer: impl Into<String>) -> Self {
        JwtConfig {
            expiry_seconds,
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Create JWT config from the loaded application configuration
    pub fn from_app_config(config: &AppConfig) -> Self {
        let crate::app_config::JwtConfig {
            secret,
            expiry_seconds,
            issuer,
        } = &config.jwt;

        Self::new(secret, *expiry_seconds, issuer.clone())
    }

    #[cfg(test)]
    pub fn for_test() -> Self {
        Self::new("test-secret-that-is-at-least-32-characters", 3600, "test.gym")
    }
}

pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(JwtConfig::from_app_config(config))
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.config.expiry_seconds
    }

    /// Generate a signed access token for a user
    pub fn generate_token(&self, user_id: Uuid, rol: Rol) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| JwtError::KeyGenerationError(e.to_string()))?
            .as_secs();

        let claims = Claims::new(
            user_id,
            rol,
            self.config.issuer.clone(),
            now,
            now + self.config.expiry_seconds,
        );

        let header = Header::new(self.config.algorithm);
        encode(&header, &claims, &self.config.encoding_key).map_err(Into::into)
    }

    /// Validates a token and returns the decoded claims
    ///
    /// # Errors
    /// * `JwtError::TokenExpired` - `exp` is in the past (no leeway)
    /// * `JwtError::InvalidToken` - bad signature, wrong issuer or malformed token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.config.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let service = JwtService::new(JwtConfig::for_test());
        let user_id = Uuid::new_v4();

        let token = service.generate_token(user_id, Rol::Recepcionista).unwrap();
        assert!(!token.is_empty());

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.id, user_id);
        assert_eq!(claims.rol, Rol::Recepcionista);
        assert_eq!(claims.iss, "test.gym");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = JwtService::new(JwtConfig::for_test());
        let other = JwtService::new(JwtConfig::new(
            "another-secret-that-is-also-32-characters",
            3600,
            "test.gym",
        ));

        let token = other.generate_token(Uuid::new_v4(), Rol::Admin).unwrap();
        assert!(matches!(service.validate_token(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let service = JwtService::new(JwtConfig::for_test());
        let foreign = JwtService::new(JwtConfig::new(
            "test-secret-that-is-at-least-32-characters",
            3600,
            "someone-else",
        ));

        let token = foreign.generate_token(Uuid::new_v4(), Rol::Admin).unwrap();
        assert!(matches!(service.validate_token(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(JwtConfig::for_test());
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let claims = Claims::new(Uuid::new_v4(), Rol::Cliente, "test.gym".into(), now - 7200, now - 60);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &JwtConfig::for_test().encoding_key,
        )
        .unwrap();

        assert!(matches!(service.validate_token(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_garbage_token() {
        let service = JwtService::new(JwtConfig::for_test());
        assert!(matches!(service.validate_token("not.a.jwt"), Err(JwtError::InvalidToken)));
        assert!(service.validate_token("").is_err());
    }
}
