// Authentication models: token claims and the auth endpoint DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{Rol, UsuarioResponse};
use crate::utils::password::validate_password_strength;

/// Access token claims: `{ id, rol, iat, exp, iss }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User ID
    pub id: Uuid,

    /// Role at the time the token was issued
    pub rol: Rol,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,

    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn new(id: Uuid, rol: Rol, issuer: String, issued_at: u64, expires_at: u64) -> Self {
        Self {
            id,
            rol,
            iat: issued_at,
            exp: expires_at,
            iss: issuer,
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.exp < now
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,

    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
}

/// Public self-registration; always creates a `cliente` user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegistroRequest {
    #[validate(length(min = 1, max = 255, message = "El nombre es obligatorio"))]
    pub nombre: String,

    #[validate(email(message = "Email inválido"))]
    pub email: String,

    #[validate(custom = "validate_password_strength")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CambiarPasswordRequest {
    #[validate(length(min = 1, message = "La contraseña actual es obligatoria"))]
    pub password_actual: String,

    #[validate(custom = "validate_password_strength")]
    pub password_nueva: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub usuario: UsuarioResponse,
}

/// Success envelope used by the auth endpoints
#[derive(Debug, Serialize)]
pub struct AuthResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
}

impl<T> AuthResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            mensaje: None,
        }
    }

    pub fn message(mensaje: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            mensaje: Some(mensaje.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_exact_fields() {
        let claims = Claims::new(
            Uuid::new_v4(),
            Rol::Entrenador,
            "gym-backoffice".to_string(),
            1640995200,
            1641081600,
        );

        let json_value = serde_json::to_value(&claims).expect("Should serialize");
        let obj = json_value.as_object().expect("Should be object");

        assert_eq!(obj.len(), 5, "Claims should have exactly 5 fields");
        for key in ["id", "rol", "iat", "exp", "iss"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj["rol"], "entrenador");
    }

    #[test]
    fn test_token_expiry_check() {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let expired = Claims::new(Uuid::new_v4(), Rol::Admin, "iss".into(), now - 3600, now - 1);
        assert!(expired.is_expired());

        let valid = Claims::new(Uuid::new_v4(), Rol::Admin, "iss".into(), now, now + 3600);
        assert!(!valid.is_expired());
    }

    #[test]
    fn test_registro_requires_strong_password() {
        let request = RegistroRequest {
            nombre: "Carla".to_string(),
            email: "carla@gym.com".to_string(),
            password: "solotexto".to_string(),
        };
        assert!(request.validate().is_err());

        let request = RegistroRequest {
            password: "segura123".to_string(),
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_auth_response_envelope() {
        let json = serde_json::to_value(AuthResponse::<()>::message("Contraseña actualizada"))
            .unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("data").is_none());
    }
}
