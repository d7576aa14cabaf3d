// Service error type shared by every resource handler
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::result::DatabaseErrorKind;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation failed: {0}")]
    InvalidFields(#[from] validator::ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    CapacityExceeded(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// JSON body returned for every failed request
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub mensaje: String,
    pub codigo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub detalle: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(mensaje: impl Into<String>, codigo: &str) -> Self {
        Self {
            success: false,
            mensaje: mensaje.into(),
            codigo: codigo.to_string(),
            detalle: None,
        }
    }
}

impl ServiceError {
    pub fn not_found(resource: &str) -> Self {
        ServiceError::NotFound(format!("{} no encontrado", resource))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::DatabaseError(_) | ServiceError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
            ServiceError::ValidationError(_)
            | ServiceError::InvalidFields(_)
            | ServiceError::CapacityExceeded(_)
            | ServiceError::InsufficientStock(_)
            | ServiceError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::DatabaseError(_) => "DATABASE_ERROR",
            ServiceError::ValidationError(_) | ServiceError::InvalidFields(_) => "VALIDATION_ERROR",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            ServiceError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            ServiceError::InvalidReference(_) => "INVALID_REFERENCE",
            ServiceError::Unauthorized => "UNAUTHORIZED",
            ServiceError::Forbidden => "FORBIDDEN",
            ServiceError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Build the client-facing body. Server faults never leak their detail.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            ServiceError::DatabaseError(_) | ServiceError::InternalError(_) => {
                ErrorBody::new("Error interno del servidor", self.error_code())
            },
            ServiceError::ValidationError(msg) => ErrorBody::new(msg.clone(), self.error_code()),
            ServiceError::InvalidFields(errors) => ErrorBody {
                detalle: serde_json::to_value(errors).ok(),
                ..ErrorBody::new("Datos de entrada inválidos", self.error_code())
            },
            ServiceError::Unauthorized => ErrorBody::new("No autenticado", self.error_code()),
            ServiceError::Forbidden => {
                ErrorBody::new("No tiene permisos para esta operación", self.error_code())
            },
            ServiceError::NotFound(msg)
            | ServiceError::Conflict(msg)
            | ServiceError::CapacityExceeded(msg)
            | ServiceError::InsufficientStock(msg)
            | ServiceError::InvalidReference(msg) => ErrorBody::new(msg.clone(), self.error_code()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error_code = self.error_code(), "{}", self);
        }

        (status, Json(self.to_body())).into_response()
    }
}

impl From<diesel::result::Error> for ServiceError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => {
                ServiceError::NotFound("Recurso no encontrado".to_string())
            },
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                tracing::debug!("Unique violation: {}", info.message());
                ServiceError::Conflict("Ya existe un registro con esos datos".to_string())
            },
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                tracing::debug!("Foreign key violation: {}", info.message());
                ServiceError::InvalidReference(
                    "El registro referenciado no existe o está en uso".to_string(),
                )
            },
            diesel::result::Error::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                tracing::debug!("Check violation: {}", info.message());
                ServiceError::ValidationError("Valor fuera del rango permitido".to_string())
            },
            _ => ServiceError::DatabaseError(error.to_string()),
        }
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for ServiceError {
    fn from(error: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        ServiceError::DatabaseError(error.to_string())
    }
}

impl From<crate::utils::password::PasswordError> for ServiceError {
    fn from(error: crate::utils::password::PasswordError) -> Self {
        ServiceError::InternalError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::CapacityExceeded("llena".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InsufficientStock("sin stock".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServiceError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServiceError::not_found("Cliente").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let error = ServiceError::DatabaseError("relation \"pagos\" does not exist".into());
        let body = error.to_body();
        assert_eq!(body.mensaje, "Error interno del servidor");
        assert_eq!(body.codigo, "DATABASE_ERROR");
        assert!(body.detalle.is_none());
        assert!(!body.success);
    }

    #[test]
    fn test_diesel_not_found_maps_to_404() {
        let error = ServiceError::from(diesel::result::Error::NotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_not_found_message() {
        let error = ServiceError::not_found("Producto");
        assert_eq!(error.to_body().mensaje, "Producto no encontrado");
    }
}
