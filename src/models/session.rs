// Sesion (attendance) database model

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::PageMeta;
use crate::schema::sesiones;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = sesiones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Sesion {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub entrenador_id: Option<Uuid>,
    pub fecha: NaiveDate,
    pub hora_entrada: DateTime<Utc>,
    pub hora_salida: Option<DateTime<Utc>>,
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sesion {
    pub fn is_open(&self) -> bool {
        self.hora_salida.is_none()
    }

    /// Length of a closed session in minutes
    pub fn duracion_minutos(&self) -> Option<i64> {
        self.hora_salida
            .map(|salida| (salida - self.hora_entrada).num_minutes())
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sesiones)]
pub struct NuevaSesion {
    pub cliente_id: Uuid,
    pub entrenador_id: Option<Uuid>,
    pub fecha: NaiveDate,
    pub hora_entrada: DateTime<Utc>,
    pub hora_salida: Option<DateTime<Utc>>,
    pub notas: Option<String>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = sesiones)]
pub struct SesionUpdate {
    pub entrenador_id: Option<Option<Uuid>>,
    pub fecha: Option<NaiveDate>,
    pub hora_entrada: Option<DateTime<Utc>>,
    pub hora_salida: Option<Option<DateTime<Utc>>>,
    pub notas: Option<Option<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CrearSesionRequest {
    pub cliente_id: Uuid,
    pub entrenador_id: Option<Uuid>,
    pub fecha: Option<NaiveDate>,
    pub hora_entrada: Option<DateTime<Utc>>,
    pub hora_salida: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notas: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarSesionRequest {
    pub entrenador_id: Option<Uuid>,
    pub fecha: Option<NaiveDate>,
    pub hora_entrada: Option<DateTime<Utc>>,
    pub hora_salida: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notas: Option<String>,
}

/// Check-out body; both fields are optional
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegistrarSalidaRequest {
    pub hora_salida: Option<DateTime<Utc>>,
    pub notas: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SesionFilter {
    pub cliente_id: Option<Uuid>,
    pub entrenador_id: Option<Uuid>,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
    /// Only sessions still without check-out
    pub abiertas: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SesionListResponse {
    pub data: Vec<Sesion>,
    pub paginacion: PageMeta,
}

pub fn validate_salida(
    hora_entrada: DateTime<Utc>,
    hora_salida: Option<DateTime<Utc>>,
) -> Result<(), String> {
    match hora_salida {
        Some(salida) if salida < hora_entrada => {
            Err("La hora de salida no puede ser anterior a la de entrada".to_string())
        },
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_salida() {
        let entrada = Utc::now();
        assert!(validate_salida(entrada, None).is_ok());
        assert!(validate_salida(entrada, Some(entrada)).is_ok());
        assert!(validate_salida(entrada, Some(entrada + Duration::minutes(45))).is_ok());
        assert!(validate_salida(entrada, Some(entrada - Duration::minutes(1))).is_err());
    }

    #[test]
    fn test_duration() {
        let entrada = Utc::now();
        let mut sesion = Sesion {
            id: Uuid::new_v4(),
            cliente_id: Uuid::new_v4(),
            entrenador_id: None,
            fecha: entrada.date_naive(),
            hora_entrada: entrada,
            hora_salida: None,
            notas: None,
            created_at: entrada,
        };
        assert!(sesion.is_open());
        assert_eq!(sesion.duracion_minutos(), None);

        sesion.hora_salida = Some(entrada + Duration::minutes(90));
        assert!(!sesion.is_open());
        assert_eq!(sesion.duracion_minutos(), Some(90));
    }
}
