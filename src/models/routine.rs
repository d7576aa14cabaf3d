// Rutina templates and their assignment to clients

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::trainer::DiaSemana;
use crate::models::PageMeta;
use crate::schema::{rutinas, rutinas_asignadas};

#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum NivelRutina {
    Principiante,
    Intermedio,
    Avanzado,
}

impl NivelRutina {
    pub fn as_str(&self) -> &'static str {
        match self {
            NivelRutina::Principiante => "principiante",
            NivelRutina::Intermedio => "intermedio",
            NivelRutina::Avanzado => "avanzado",
        }
    }
}

impl FromStr for NivelRutina {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "principiante" => Ok(NivelRutina::Principiante),
            "intermedio" => Ok(NivelRutina::Intermedio),
            "avanzado" => Ok(NivelRutina::Avanzado),
            _ => Err(format!("Nivel de rutina inválido: {}", s)),
        }
    }
}

impl_text_sql!(NivelRutina);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Ejercicio {
    #[validate(length(min = 1, max = 255, message = "El nombre del ejercicio es obligatorio"))]
    pub nombre: String,

    #[validate(range(min = 1, message = "Las series deben ser al menos 1"))]
    pub series: i32,

    #[validate(range(min = 1, message = "Las repeticiones deben ser al menos 1"))]
    pub repeticiones: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub descanso_segundos: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = rutinas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Rutina {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub nivel: NivelRutina,
    pub objetivo: Option<String>,
    pub ejercicios: serde_json::Value,
    pub creado_por: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = rutinas)]
pub struct NuevaRutina {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub nivel: NivelRutina,
    pub objetivo: Option<String>,
    pub ejercicios: serde_json::Value,
    pub creado_por: Option<Uuid>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = rutinas)]
pub struct RutinaUpdate {
    pub nombre: Option<String>,
    pub descripcion: Option<Option<String>>,
    pub nivel: Option<NivelRutina>,
    pub objetivo: Option<Option<String>>,
    pub ejercicios: Option<serde_json::Value>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RutinaResponse {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub nivel: NivelRutina,
    pub objetivo: Option<String>,
    pub ejercicios: Vec<Ejercicio>,
    pub creado_por: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Rutina> for RutinaResponse {
    type Error = serde_json::Error;

    fn try_from(rutina: Rutina) -> Result<Self, Self::Error> {
        Ok(Self {
            ejercicios: serde_json::from_value(rutina.ejercicios)?,
            id: rutina.id,
            nombre: rutina.nombre,
            descripcion: rutina.descripcion,
            nivel: rutina.nivel,
            objetivo: rutina.objetivo,
            creado_por: rutina.creado_por,
            created_at: rutina.created_at,
            updated_at: rutina.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CrearRutinaRequest {
    #[validate(length(min = 1, max = 255, message = "El nombre es obligatorio"))]
    pub nombre: String,

    pub descripcion: Option<String>,
    pub nivel: NivelRutina,

    #[validate(length(max = 255))]
    pub objetivo: Option<String>,

    #[serde(default)]
    #[validate]
    pub ejercicios: Vec<Ejercicio>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarRutinaRequest {
    #[validate(length(min = 1, max = 255))]
    pub nombre: Option<String>,

    pub descripcion: Option<String>,
    pub nivel: Option<NivelRutina>,

    #[validate(length(max = 255))]
    pub objetivo: Option<String>,

    /// Replaces the whole exercise list when present
    pub ejercicios: Option<Vec<Ejercicio>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RutinaFilter {
    pub nivel: Option<NivelRutina>,
    pub buscar: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RutinaListResponse {
    pub data: Vec<RutinaResponse>,
    pub paginacion: PageMeta,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = rutinas_asignadas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RutinaAsignada {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub rutina_id: Uuid,
    pub dias_entrenamiento: Vec<String>,
    pub dias_descanso: Vec<String>,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: Option<NaiveDate>,
    pub activa: bool,
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = rutinas_asignadas)]
pub struct NuevaRutinaAsignada {
    pub cliente_id: Uuid,
    pub rutina_id: Uuid,
    pub dias_entrenamiento: Vec<String>,
    pub dias_descanso: Vec<String>,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: Option<NaiveDate>,
    pub activa: bool,
    pub notas: Option<String>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = rutinas_asignadas)]
pub struct RutinaAsignadaUpdate {
    pub dias_entrenamiento: Option<Vec<String>>,
    pub dias_descanso: Option<Vec<String>>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<Option<NaiveDate>>,
    pub activa: Option<bool>,
    pub notas: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AsignarRutinaRequest {
    pub cliente_id: Uuid,
    pub rutina_id: Uuid,
    pub dias_entrenamiento: Vec<DiaSemana>,
    #[serde(default)]
    pub dias_descanso: Vec<DiaSemana>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub activa: Option<bool>,
    pub notas: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarAsignacionRequest {
    pub dias_entrenamiento: Option<Vec<DiaSemana>>,
    pub dias_descanso: Option<Vec<DiaSemana>>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub activa: Option<bool>,
    pub notas: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AsignacionFilter {
    pub cliente_id: Option<Uuid>,
    pub rutina_id: Option<Uuid>,
    pub activa: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AsignacionListResponse {
    pub data: Vec<RutinaAsignada>,
    pub paginacion: PageMeta,
}

/// A client's assignment together with the routine it points to
#[derive(Debug, Serialize, ToSchema)]
pub struct MiRutina {
    pub asignacion: RutinaAsignada,
    pub rutina: RutinaResponse,
}

/// Training days must be non-empty; neither list may repeat a day and
/// the two lists must not share one
pub fn validate_dias(entrenamiento: &[DiaSemana], descanso: &[DiaSemana]) -> Result<(), String> {
    if entrenamiento.is_empty() {
        return Err("Debe indicar al menos un día de entrenamiento".to_string());
    }

    let mut seen = HashSet::new();
    for dia in entrenamiento {
        if !seen.insert(*dia) {
            return Err(format!("Día de entrenamiento repetido: {}", dia));
        }
    }

    let mut descanso_seen = HashSet::new();
    for dia in descanso {
        if !descanso_seen.insert(*dia) {
            return Err(format!("Día de descanso repetido: {}", dia));
        }
        if seen.contains(dia) {
            return Err(format!(
                "El día {} no puede ser de entrenamiento y de descanso a la vez",
                dia
            ));
        }
    }
    Ok(())
}

pub fn validate_periodo(fecha_inicio: NaiveDate, fecha_fin: Option<NaiveDate>) -> Result<(), String> {
    match fecha_fin {
        Some(fin) if fin < fecha_inicio => Err(format!(
            "La fecha de fin ({}) no puede ser anterior a la de inicio ({})",
            fin, fecha_inicio
        )),
        _ => Ok(()),
    }
}

pub fn dias_to_strings(dias: &[DiaSemana]) -> Vec<String> {
    dias.iter().map(|d| d.as_str().to_string()).collect()
}

/// Stored weekday strings back to typed days, skipping anything unknown
pub fn dias_from_strings(dias: &[String]) -> Vec<DiaSemana> {
    dias.iter().filter_map(|d| d.parse().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use DiaSemana::*;

    #[test]
    fn test_validate_dias() {
        assert!(validate_dias(&[Lunes, Miercoles, Viernes], &[Martes, Jueves]).is_ok());
        assert!(validate_dias(&[], &[Martes]).is_err());
        assert!(validate_dias(&[Lunes, Lunes], &[]).is_err());
        assert!(validate_dias(&[Lunes], &[Domingo, Domingo]).is_err());
        assert!(validate_dias(&[Lunes, Martes], &[Martes]).is_err());
    }

    #[test]
    fn test_validate_periodo() {
        let inicio = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(validate_periodo(inicio, None).is_ok());
        assert!(validate_periodo(inicio, Some(inicio)).is_ok());
        assert!(validate_periodo(inicio, NaiveDate::from_ymd_opt(2025, 2, 28)).is_err());
    }

    #[test]
    fn test_dias_string_conversion() {
        let dias = vec![Lunes, Sabado];
        let stored = dias_to_strings(&dias);
        assert_eq!(stored, vec!["lunes".to_string(), "sabado".to_string()]);
        assert_eq!(dias_from_strings(&stored), dias);
    }

    #[test]
    fn test_ejercicio_validation() {
        let request: CrearRutinaRequest = serde_json::from_value(serde_json::json!({
            "nombre": "Fuerza básica",
            "nivel": "principiante",
            "ejercicios": [{"nombre": "Sentadilla", "series": 0, "repeticiones": 10}]
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
