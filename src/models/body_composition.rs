// ComposicionCorporal database model

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::PageMeta;
use crate::schema::composicion_corporal;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = composicion_corporal)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ComposicionCorporal {
    pub id: Uuid,
    pub cliente_identificacion: String,
    pub fecha: NaiveDate,
    pub peso_kg: f64,
    pub altura_cm: Option<f64>,
    pub porcentaje_grasa: Option<f64>,
    pub masa_muscular_kg: Option<f64>,
    pub agua_corporal: Option<f64>,
    pub grasa_visceral: Option<f64>,
    pub imc: Option<f64>,
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = composicion_corporal)]
pub struct NuevaComposicion {
    pub cliente_identificacion: String,
    pub fecha: NaiveDate,
    pub peso_kg: f64,
    pub altura_cm: Option<f64>,
    pub porcentaje_grasa: Option<f64>,
    pub masa_muscular_kg: Option<f64>,
    pub agua_corporal: Option<f64>,
    pub grasa_visceral: Option<f64>,
    pub imc: Option<f64>,
    pub notas: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = composicion_corporal)]
#[diesel(treat_none_as_null = true)]
pub struct ComposicionChanges {
    pub fecha: NaiveDate,
    pub peso_kg: f64,
    pub altura_cm: Option<f64>,
    pub porcentaje_grasa: Option<f64>,
    pub masa_muscular_kg: Option<f64>,
    pub agua_corporal: Option<f64>,
    pub grasa_visceral: Option<f64>,
    pub imc: Option<f64>,
    pub notas: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CrearComposicionRequest {
    #[validate(length(min = 1, max = 50, message = "La identificación del cliente es obligatoria"))]
    pub cliente_identificacion: String,

    pub fecha: Option<NaiveDate>,

    #[validate(range(min = 0.1, max = 500.0, message = "El peso debe ser mayor que cero"))]
    pub peso_kg: f64,

    #[validate(range(min = 1.0, max = 300.0, message = "La altura debe ser mayor que cero"))]
    pub altura_cm: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "El porcentaje de grasa debe estar entre 0 y 100"))]
    pub porcentaje_grasa: Option<f64>,

    #[validate(range(min = 0.0))]
    pub masa_muscular_kg: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "El agua corporal debe estar entre 0 y 100"))]
    pub agua_corporal: Option<f64>,

    #[validate(range(min = 0.0))]
    pub grasa_visceral: Option<f64>,

    pub notas: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarComposicionRequest {
    pub fecha: Option<NaiveDate>,

    #[validate(range(min = 0.1, max = 500.0, message = "El peso debe ser mayor que cero"))]
    pub peso_kg: Option<f64>,

    #[validate(range(min = 1.0, max = 300.0, message = "La altura debe ser mayor que cero"))]
    pub altura_cm: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub porcentaje_grasa: Option<f64>,

    #[validate(range(min = 0.0))]
    pub masa_muscular_kg: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub agua_corporal: Option<f64>,

    #[validate(range(min = 0.0))]
    pub grasa_visceral: Option<f64>,

    pub notas: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ComposicionFilter {
    pub cliente_identificacion: Option<String>,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComposicionListResponse {
    pub data: Vec<ComposicionCorporal>,
    pub paginacion: PageMeta,
}

/// A client's measurements ordered by date, oldest first
#[derive(Debug, Serialize, ToSchema)]
pub struct HistorialComposicion {
    pub cliente_identificacion: String,
    pub registros: Vec<ComposicionCorporal>,
    pub ultimo: Option<ComposicionCorporal>,
    /// Last weight minus first weight, in kg
    pub variacion_peso_kg: Option<f64>,
}

impl HistorialComposicion {
    pub fn new(cliente_identificacion: String, registros: Vec<ComposicionCorporal>) -> Self {
        let ultimo = registros.last().cloned();
        let variacion_peso_kg = weight_delta(&registros);
        Self {
            cliente_identificacion,
            registros,
            ultimo,
            variacion_peso_kg,
        }
    }
}

/// Body mass index from kilograms and centimetres, rounded to two decimals
pub fn calcular_imc(peso_kg: f64, altura_cm: Option<f64>) -> Option<f64> {
    let altura_m = altura_cm? / 100.0;
    if altura_m <= 0.0 || peso_kg <= 0.0 {
        return None;
    }
    Some(((peso_kg / (altura_m * altura_m)) * 100.0).round() / 100.0)
}

/// Needs at least two records
pub fn weight_delta(registros: &[ComposicionCorporal]) -> Option<f64> {
    match (registros.first(), registros.last()) {
        (Some(first), Some(last)) if registros.len() > 1 => {
            Some(((last.peso_kg - first.peso_kg) * 100.0).round() / 100.0)
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registro(fecha: &str, peso_kg: f64) -> ComposicionCorporal {
        let now = Utc::now();
        ComposicionCorporal {
            id: Uuid::new_v4(),
            cliente_identificacion: "1001".to_string(),
            fecha: fecha.parse().unwrap(),
            peso_kg,
            altura_cm: Some(175.0),
            porcentaje_grasa: None,
            masa_muscular_kg: None,
            agua_corporal: None,
            grasa_visceral: None,
            imc: calcular_imc(peso_kg, Some(175.0)),
            notas: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_calcular_imc() {
        assert_eq!(calcular_imc(70.0, Some(175.0)), Some(22.86));
        assert_eq!(calcular_imc(70.0, None), None);
        assert_eq!(calcular_imc(70.0, Some(0.0)), None);
    }

    #[test]
    fn test_historial_summary() {
        let historial = HistorialComposicion::new(
            "1001".to_string(),
            vec![
                registro("2025-01-10", 82.5),
                registro("2025-02-10", 80.0),
                registro("2025-03-10", 78.3),
            ],
        );
        assert_eq!(historial.variacion_peso_kg, Some(-4.2));
        assert_eq!(historial.ultimo.map(|r| r.peso_kg), Some(78.3));
    }

    #[test]
    fn test_single_record_has_no_delta() {
        let historial = HistorialComposicion::new("1001".to_string(), vec![registro("2025-01-10", 80.0)]);
        assert_eq!(historial.variacion_peso_kg, None);
        assert!(historial.ultimo.is_some());

        let empty = HistorialComposicion::new("1001".to_string(), vec![]);
        assert!(empty.ultimo.is_none());
    }

    #[test]
    fn test_percentage_bounds() {
        let request: CrearComposicionRequest = serde_json::from_value(serde_json::json!({
            "cliente_identificacion": "1001",
            "peso_kg": 75.0,
            "porcentaje_grasa": 120.0
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("porcentaje_grasa"));
    }
}
