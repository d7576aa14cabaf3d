// Utility modules

pub mod audit_logger;
pub mod auth_errors;
pub mod password;
pub mod service_error;
pub mod validation;

pub use audit_logger::{AuditAction, AuditLogger};
pub use auth_errors::{log_auth_failure, AuthError};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
pub use service_error::{ErrorBody, ServiceError};
pub use validation::{
    normalize_email, trim_and_validate_field, trim_optional_field, validate_date_range,
    validate_hora, validate_time_range,
};
