// Usuario database model
// One user table for every role; the role lives in `rol`

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::schema::usuarios;
use crate::utils::password::validate_password_strength;

/// Role enumeration for authorization
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    Admin,
    Entrenador,
    Recepcionista,
    Cliente,
}

impl Rol {
    pub const ALL: [Rol; 4] = [Rol::Admin, Rol::Entrenador, Rol::Recepcionista, Rol::Cliente];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rol::Admin => "admin",
            Rol::Entrenador => "entrenador",
            Rol::Recepcionista => "recepcionista",
            Rol::Cliente => "cliente",
        }
    }

    /// Gym staff: everyone except clients
    pub fn is_staff(&self) -> bool {
        !matches!(self, Rol::Cliente)
    }
}

impl FromStr for Rol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Rol::Admin),
            "entrenador" => Ok(Rol::Entrenador),
            "recepcionista" => Ok(Rol::Recepcionista),
            "cliente" => Ok(Rol::Cliente),
            _ => Err(format!("Rol inválido: {}", s)),
        }
    }
}

impl std::fmt::Display for Rol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl_text_sql!(Rol);

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = usuarios)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Usuario {
    pub id: Uuid,
    pub nombre: String,
    pub email: String,
    pub password_hash: String,
    pub rol: Rol,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = usuarios)]
pub struct NuevoUsuario {
    pub nombre: String,
    pub email: String,
    pub password_hash: String,
    pub rol: Rol,
    pub activo: bool,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = usuarios)]
pub struct UsuarioUpdate {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub rol: Option<Rol>,
    pub activo: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Public view of a user, never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsuarioResponse {
    pub id: Uuid,
    pub nombre: String,
    pub email: String,
    pub rol: Rol,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Usuario> for UsuarioResponse {
    fn from(usuario: Usuario) -> Self {
        Self {
            id: usuario.id,
            nombre: usuario.nombre,
            email: usuario.email,
            rol: usuario.rol,
            activo: usuario.activo,
            created_at: usuario.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CrearUsuarioRequest {
    #[validate(length(min = 1, max = 255, message = "El nombre es obligatorio"))]
    pub nombre: String,

    #[validate(email(message = "Email inválido"))]
    pub email: String,

    #[validate(custom = "validate_password_strength")]
    pub password: String,

    pub rol: Rol,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarUsuarioRequest {
    #[validate(length(min = 1, max = 255, message = "El nombre no puede estar vacío"))]
    pub nombre: Option<String>,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,

    #[validate(custom = "validate_password_strength")]
    pub password: Option<String>,

    pub rol: Option<Rol>,
    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsuarioFilter {
    pub rol: Option<Rol>,
    pub activo: Option<bool>,
    /// Matches name or email
    pub buscar: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsuarioListResponse {
    pub data: Vec<UsuarioResponse>,
    pub paginacion: crate::models::PageMeta,
}

/// Errors for user lookups
#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("User not found")]
    NotFound,
}

impl From<UserError> for crate::utils::ServiceError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::NotFound => crate::utils::ServiceError::not_found("Usuario"),
            UserError::Database(e) => e.into(),
        }
    }
}

impl Usuario {
    pub async fn find_by_id(conn: &mut AsyncPgConnection, user_id: Uuid) -> Result<Self, UserError> {
        use crate::schema::usuarios::dsl::*;

        usuarios
            .filter(id.eq(user_id))
            .select(Usuario::as_select())
            .first::<Usuario>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => UserError::NotFound,
                _ => UserError::Database(e),
            })
    }

    /// Emails are stored lower-case, so lookups normalize first
    pub async fn find_by_email(
        conn: &mut AsyncPgConnection,
        email_str: &str,
    ) -> Result<Self, UserError> {
        use crate::schema::usuarios::dsl::*;

        usuarios
            .filter(email.eq(email_str.trim().to_lowercase()))
            .select(Usuario::as_select())
            .first::<Usuario>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => UserError::NotFound,
                _ => UserError::Database(e),
            })
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_user: NuevoUsuario,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(usuarios::table)
            .values(&new_user)
            .returning(Usuario::as_returning())
            .get_result(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rol_conversion() {
        for rol in Rol::ALL {
            assert_eq!(Rol::from_str(rol.as_str()), Ok(rol));
        }
        assert_eq!(Rol::from_str(" Admin "), Ok(Rol::Admin));
        assert!(Rol::from_str("role").is_err());
        assert!(Rol::from_str("").is_err());
    }

    #[test]
    fn test_rol_serde_lowercase() {
        let json = serde_json::to_string(&Rol::Recepcionista).unwrap();
        assert_eq!(json, "\"recepcionista\"");
        let parsed: Rol = serde_json::from_str("\"entrenador\"").unwrap();
        assert_eq!(parsed, Rol::Entrenador);
        assert!(serde_json::from_str::<Rol>("\"superuser\"").is_err());
    }

    #[test]
    fn test_staff_roles() {
        assert!(Rol::Admin.is_staff());
        assert!(Rol::Recepcionista.is_staff());
        assert!(Rol::Entrenador.is_staff());
        assert!(!Rol::Cliente.is_staff());
    }

    #[test]
    fn test_response_hides_hash() {
        let now = Utc::now();
        let usuario = Usuario {
            id: Uuid::new_v4(),
            nombre: "Ana".to_string(),
            email: "ana@gym.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            rol: Rol::Recepcionista,
            activo: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UsuarioResponse::from(usuario)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["rol"], "recepcionista");
    }

    #[test]
    fn test_create_request_validation() {
        let request = CrearUsuarioRequest {
            nombre: "Luis".to_string(),
            email: "no-es-email".to_string(),
            password: "corta".to_string(),
            rol: Rol::Entrenador,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }
}
