// InscripcionClase database model plus availability and catalogue views

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::trainer::DiaSemana;
use crate::models::PageMeta;
use crate::schema::inscripciones_clase;
use crate::utils::validation::validate_hora;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = inscripciones_clase)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InscripcionClase {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub entrenador_id: Uuid,
    pub nombre_clase: String,
    pub dia: String,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inscripciones_clase)]
pub struct NuevaInscripcion {
    pub cliente_id: Uuid,
    pub entrenador_id: Uuid,
    pub nombre_clase: String,
    pub dia: String,
    pub hora_inicio: String,
    pub hora_fin: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct InscribirRequest {
    pub cliente_id: Uuid,
    pub entrenador_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "El nombre de la clase es obligatorio"))]
    pub nombre_clase: String,

    pub dia: DiaSemana,

    #[validate(custom = "validate_hora")]
    pub hora_inicio: String,

    #[validate(custom = "validate_hora")]
    pub hora_fin: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InscripcionFilter {
    pub entrenador_id: Option<Uuid>,
    pub cliente_id: Option<Uuid>,
    /// Case-insensitive class name
    pub nombre_clase: Option<String>,
    pub dia: Option<DiaSemana>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InscripcionListResponse {
    pub data: Vec<InscripcionClase>,
    pub paginacion: PageMeta,
}

/// Slot identified by trainer, class and weekly time window
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DisponibilidadQuery {
    pub entrenador_id: Uuid,

    #[validate(length(min = 1))]
    pub nombre_clase: String,

    pub dia: DiaSemana,

    #[validate(custom = "validate_hora")]
    pub hora_inicio: String,

    #[validate(custom = "validate_hora")]
    pub hora_fin: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct Disponibilidad {
    pub entrenador_id: Uuid,
    pub nombre_clase: String,
    pub dia: DiaSemana,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub capacidad: i32,
    pub ocupados: i64,
    pub disponibles: i64,
}

impl Disponibilidad {
    pub fn is_full(&self) -> bool {
        self.disponibles == 0
    }
}

/// Seats left in a slot, never negative
pub fn seats_available(capacidad: i32, ocupados: i64) -> i64 {
    (i64::from(capacidad) - ocupados).max(0)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HorarioOcupacion {
    pub dia: DiaSemana,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub ocupados: i64,
    pub disponibles: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClaseCatalogo {
    pub entrenador_id: Uuid,
    pub entrenador: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub capacidad_maxima: i32,
    pub horarios: Vec<HorarioOcupacion>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogoFilter {
    pub entrenador_id: Option<Uuid>,
    /// Only slots on this weekday
    pub dia: Option<DiaSemana>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seats_available() {
        assert_eq!(seats_available(10, 3), 7);
        assert_eq!(seats_available(2, 2), 0);
        // capacity lowered below existing registrations
        assert_eq!(seats_available(2, 5), 0);
    }

    #[test]
    fn test_inscribir_request_validation() {
        let request: InscribirRequest = serde_json::from_value(serde_json::json!({
            "cliente_id": Uuid::new_v4(),
            "entrenador_id": Uuid::new_v4(),
            "nombre_clase": "Spinning",
            "dia": "martes",
            "hora_inicio": "07:00",
            "hora_fin": "8:00"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("hora_fin"));
    }
}
