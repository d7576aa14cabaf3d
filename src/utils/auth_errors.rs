// Authentication-specific error handling utilities

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use thiserror::Error;

use crate::utils::service_error::ErrorBody;

/// Authentication-specific errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing or invalid authorization header")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Role not allowed")]
    Forbidden,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Token generation failed: {0}")]
    TokenError(String),

    #[error("Internal server error")]
    InternalError,
}

impl AuthError {
    /// Convert to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::AccountInactive => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::EmailAlreadyExists => StatusCode::CONFLICT,
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AuthError::DatabaseError(_) | AuthError::TokenError(_) | AuthError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Convert to error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingToken => "UNAUTHORIZED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::AccountInactive => "ACCOUNT_INACTIVE",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::EmailAlreadyExists => "CONFLICT",
            AuthError::ValidationError(_) => "VALIDATION_ERROR",
            AuthError::DatabaseError(_) => "DATABASE_ERROR",
            AuthError::TokenError(_) => "TOKEN_ERROR",
            AuthError::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Message shown to the client
    pub fn client_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Credenciales inválidas".to_string(),
            AuthError::MissingToken => "Token de autenticación requerido".to_string(),
            AuthError::InvalidToken => "Token inválido".to_string(),
            AuthError::TokenExpired => "Token expirado".to_string(),
            AuthError::AccountInactive => "Usuario inactivo o inexistente".to_string(),
            AuthError::Forbidden => "No tiene permisos para esta operación".to_string(),
            AuthError::EmailAlreadyExists => "El email ya está registrado".to_string(),
            AuthError::ValidationError(msg) => msg.clone(),
            AuthError::DatabaseError(_) | AuthError::TokenError(_) | AuthError::InternalError => {
                "Error interno del servidor".to_string()
            },
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error_code = self.error_code(), "{}", self);
        }

        (status, Json(ErrorBody::new(self.client_message(), self.error_code()))).into_response()
    }
}

impl From<crate::services::jwt::JwtError> for AuthError {
    fn from(error: crate::services::jwt::JwtError) -> Self {
        use crate::services::jwt::JwtError;
        match error {
            JwtError::TokenExpired => AuthError::TokenExpired,
            JwtError::InvalidToken => AuthError::InvalidToken,
            JwtError::EncodingError(msg) | JwtError::KeyGenerationError(msg) => {
                AuthError::TokenError(msg)
            },
        }
    }
}

impl From<crate::utils::service_error::ServiceError> for AuthError {
    fn from(error: crate::utils::service_error::ServiceError) -> Self {
        use crate::utils::service_error::ServiceError;
        match error {
            ServiceError::Conflict(_) => AuthError::EmailAlreadyExists,
            ServiceError::ValidationError(msg) => AuthError::ValidationError(msg),
            ServiceError::InvalidFields(errors) => AuthError::ValidationError(errors.to_string()),
            ServiceError::NotFound(_) | ServiceError::Unauthorized => AuthError::AccountInactive,
            ServiceError::Forbidden => AuthError::Forbidden,
            other => AuthError::DatabaseError(other.to_string()),
        }
    }
}

/// Helper function to log authentication failures
pub fn log_auth_failure(user_email: &str, error: &AuthError, user_agent: Option<&str>) {
    tracing::warn!(
        email = user_email,
        user_agent = user_agent.unwrap_or("unknown"),
        error_code = error.error_code(),
        "Authentication failure"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_are_401() {
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AccountInactive.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let error = AuthError::DatabaseError("connection refused".to_string());
        assert_eq!(error.client_message(), "Error interno del servidor");
        assert_eq!(error.error_code(), "DATABASE_ERROR");
    }
}
