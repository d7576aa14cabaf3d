// Cliente database model

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::PageMeta;
use crate::schema::clientes;

/// Membership state of a client
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "lowercase")]
pub enum EstadoCliente {
    #[default]
    Activo,
    Inactivo,
    Suspendido,
}

impl EstadoCliente {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoCliente::Activo => "activo",
            EstadoCliente::Inactivo => "inactivo",
            EstadoCliente::Suspendido => "suspendido",
        }
    }
}

impl FromStr for EstadoCliente {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activo" => Ok(EstadoCliente::Activo),
            "inactivo" => Ok(EstadoCliente::Inactivo),
            "suspendido" => Ok(EstadoCliente::Suspendido),
            _ => Err(format!("Estado de cliente inválido: {}", s)),
        }
    }
}

impl_text_sql!(EstadoCliente);

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = clientes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Cliente {
    pub id: Uuid,
    pub identificacion: String,
    pub nombre: String,
    pub apellido: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub direccion: Option<String>,
    pub fecha_inscripcion: NaiveDate,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub estado: EstadoCliente,
    pub usuario_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cliente {
    pub fn nombre_completo(&self) -> String {
        format!("{} {}", self.nombre, self.apellido)
    }

    pub fn is_active(&self) -> bool {
        self.estado == EstadoCliente::Activo
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = clientes)]
pub struct NuevoCliente {
    pub identificacion: String,
    pub nombre: String,
    pub apellido: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub direccion: Option<String>,
    pub fecha_inscripcion: NaiveDate,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub estado: EstadoCliente,
    pub usuario_id: Option<Uuid>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = clientes)]
pub struct ClienteUpdate {
    pub identificacion: Option<String>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub email: Option<Option<String>>,
    pub telefono: Option<Option<String>>,
    pub fecha_nacimiento: Option<Option<NaiveDate>>,
    pub direccion: Option<Option<String>>,
    pub fecha_inscripcion: Option<NaiveDate>,
    pub fecha_vencimiento: Option<Option<NaiveDate>>,
    pub estado: Option<EstadoCliente>,
    pub usuario_id: Option<Option<Uuid>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CrearClienteRequest {
    #[validate(length(min = 1, max = 50, message = "La identificación es obligatoria"))]
    pub identificacion: String,

    #[validate(length(min = 1, max = 100, message = "El nombre es obligatorio"))]
    pub nombre: String,

    #[validate(length(min = 1, max = 100, message = "El apellido es obligatorio"))]
    pub apellido: String,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,

    #[validate(length(max = 30))]
    pub telefono: Option<String>,

    pub fecha_nacimiento: Option<NaiveDate>,
    pub direccion: Option<String>,
    pub fecha_inscripcion: Option<NaiveDate>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub estado: Option<EstadoCliente>,
    pub usuario_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarClienteRequest {
    #[validate(length(min = 1, max = 50, message = "La identificación no puede estar vacía"))]
    pub identificacion: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub nombre: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub apellido: Option<String>,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,

    #[validate(length(max = 30))]
    pub telefono: Option<String>,

    pub fecha_nacimiento: Option<NaiveDate>,
    pub direccion: Option<String>,
    pub fecha_inscripcion: Option<NaiveDate>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub estado: Option<EstadoCliente>,
    pub usuario_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClienteFilter {
    pub estado: Option<EstadoCliente>,
    /// Matches name, surname, identification or email
    pub buscar: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClienteListResponse {
    pub data: Vec<Cliente>,
    pub paginacion: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estado_default_and_parse() {
        assert_eq!(EstadoCliente::default(), EstadoCliente::Activo);
        assert_eq!("suspendido".parse::<EstadoCliente>(), Ok(EstadoCliente::Suspendido));
        assert!("baja".parse::<EstadoCliente>().is_err());
    }

    #[test]
    fn test_crear_cliente_validation() {
        let request: CrearClienteRequest = serde_json::from_value(serde_json::json!({
            "identificacion": "",
            "nombre": "Pedro",
            "apellido": "Gómez",
            "email": "pedro-at-gym"
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("identificacion"));
        assert!(errors.field_errors().contains_key("email"));
    }
}
