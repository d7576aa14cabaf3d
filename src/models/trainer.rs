// Entrenador database model and its embedded class documents
// `clases` lives in a JSONB column and is typed on the way in and out

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::PageMeta;
use crate::schema::entrenadores;
use crate::utils::validation::{validate_hora, validate_time_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiaSemana {
    Lunes,
    Martes,
    #[serde(alias = "miércoles")]
    Miercoles,
    Jueves,
    Viernes,
    #[serde(alias = "sábado")]
    Sabado,
    Domingo,
}

impl DiaSemana {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiaSemana::Lunes => "lunes",
            DiaSemana::Martes => "martes",
            DiaSemana::Miercoles => "miercoles",
            DiaSemana::Jueves => "jueves",
            DiaSemana::Viernes => "viernes",
            DiaSemana::Sabado => "sabado",
            DiaSemana::Domingo => "domingo",
        }
    }

    /// Weekday for a calendar date
    pub fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => DiaSemana::Lunes,
            chrono::Weekday::Tue => DiaSemana::Martes,
            chrono::Weekday::Wed => DiaSemana::Miercoles,
            chrono::Weekday::Thu => DiaSemana::Jueves,
            chrono::Weekday::Fri => DiaSemana::Viernes,
            chrono::Weekday::Sat => DiaSemana::Sabado,
            chrono::Weekday::Sun => DiaSemana::Domingo,
        }
    }
}

impl FromStr for DiaSemana {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lunes" => Ok(DiaSemana::Lunes),
            "martes" => Ok(DiaSemana::Martes),
            "miercoles" | "miércoles" => Ok(DiaSemana::Miercoles),
            "jueves" => Ok(DiaSemana::Jueves),
            "viernes" => Ok(DiaSemana::Viernes),
            "sabado" | "sábado" => Ok(DiaSemana::Sabado),
            "domingo" => Ok(DiaSemana::Domingo),
            _ => Err(format!("Día inválido: {}", s)),
        }
    }
}

impl std::fmt::Display for DiaSemana {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weekly slot of a class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate, ToSchema)]
pub struct Horario {
    pub dia: DiaSemana,

    #[validate(custom = "validate_hora")]
    pub hora_inicio: String,

    #[validate(custom = "validate_hora")]
    pub hora_fin: String,
}

impl Horario {
    pub fn matches(&self, dia: DiaSemana, hora_inicio: &str, hora_fin: &str) -> bool {
        self.dia == dia && self.hora_inicio == hora_inicio && self.hora_fin == hora_fin
    }
}

/// A class taught by a trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ClaseEntrenador {
    #[validate(length(min = 1, max = 100, message = "El nombre de la clase es obligatorio"))]
    pub nombre: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,

    /// Filled with the configured default when omitted
    #[serde(default)]
    #[validate(range(min = 1, message = "La capacidad máxima debe ser al menos 1"))]
    pub capacidad_maxima: Option<i32>,

    #[serde(default)]
    #[validate]
    pub horarios: Vec<Horario>,
}

impl ClaseEntrenador {
    pub fn capacidad(&self, default_capacity: i32) -> i32 {
        self.capacidad_maxima.unwrap_or(default_capacity)
    }

    pub fn has_slot(&self, dia: DiaSemana, hora_inicio: &str, hora_fin: &str) -> bool {
        self.horarios
            .iter()
            .any(|h| h.matches(dia, hora_inicio, hora_fin))
    }
}

/// Structural checks the derive cannot express: slot ordering,
/// duplicate slots and case-insensitive class name uniqueness
pub fn validate_clases(clases: &[ClaseEntrenador]) -> Result<(), String> {
    let mut nombres = HashSet::new();
    for clase in clases {
        let nombre = clase.nombre.trim().to_lowercase();
        if nombre.is_empty() {
            return Err("El nombre de la clase es obligatorio".to_string());
        }
        if !nombres.insert(nombre) {
            return Err(format!("La clase '{}' está repetida", clase.nombre.trim()));
        }

        let mut slots = HashSet::new();
        for horario in &clase.horarios {
            validate_time_range(&horario.hora_inicio, &horario.hora_fin)?;
            if !slots.insert(horario) {
                return Err(format!(
                    "Horario repetido en la clase '{}': {} {}-{}",
                    clase.nombre, horario.dia, horario.hora_inicio, horario.hora_fin
                ));
            }
        }
    }
    Ok(())
}

/// Fill omitted capacities and trim names before storing
pub fn normalize_clases(clases: Vec<ClaseEntrenador>, default_capacity: i32) -> Vec<ClaseEntrenador> {
    clases
        .into_iter()
        .map(|clase| ClaseEntrenador {
            nombre: clase.nombre.trim().to_string(),
            capacidad_maxima: Some(clase.capacidad(default_capacity)),
            ..clase
        })
        .collect()
}

/// Whether a class stored under exactly `nombre` still declares the slot.
/// Registrations keep the stored class name, so the match is exact.
pub fn declares_slot(
    clases: &[ClaseEntrenador],
    nombre: &str,
    dia: &str,
    hora_inicio: &str,
    hora_fin: &str,
) -> bool {
    clases.iter().filter(|c| c.nombre == nombre).any(|c| {
        c.horarios
            .iter()
            .any(|h| h.dia.as_str() == dia && h.hora_inicio == hora_inicio && h.hora_fin == hora_fin)
    })
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = entrenadores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Entrenador {
    pub id: Uuid,
    pub nombre: String,
    pub apellido: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub especialidad: Option<String>,
    pub activo: bool,
    pub clases: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entrenador {
    /// Decode the JSONB class list
    pub fn clases(&self) -> Result<Vec<ClaseEntrenador>, serde_json::Error> {
        serde_json::from_value(self.clases.clone())
    }

    /// Case-insensitive lookup of a class by name
    pub fn find_clase(&self, nombre: &str) -> Result<Option<ClaseEntrenador>, serde_json::Error> {
        let wanted = nombre.trim().to_lowercase();
        Ok(self
            .clases()?
            .into_iter()
            .find(|c| c.nombre.trim().to_lowercase() == wanted))
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = entrenadores)]
pub struct NuevoEntrenador {
    pub nombre: String,
    pub apellido: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub especialidad: Option<String>,
    pub activo: bool,
    pub clases: serde_json::Value,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = entrenadores)]
pub struct EntrenadorUpdate {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub email: Option<Option<String>>,
    pub telefono: Option<Option<String>>,
    pub especialidad: Option<Option<String>>,
    pub activo: Option<bool>,
    pub clases: Option<serde_json::Value>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntrenadorResponse {
    pub id: Uuid,
    pub nombre: String,
    pub apellido: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub especialidad: Option<String>,
    pub activo: bool,
    pub clases: Vec<ClaseEntrenador>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Entrenador> for EntrenadorResponse {
    type Error = serde_json::Error;

    fn try_from(entrenador: Entrenador) -> Result<Self, Self::Error> {
        let clases = entrenador.clases()?;
        Ok(Self {
            id: entrenador.id,
            nombre: entrenador.nombre,
            apellido: entrenador.apellido,
            email: entrenador.email,
            telefono: entrenador.telefono,
            especialidad: entrenador.especialidad,
            activo: entrenador.activo,
            clases,
            created_at: entrenador.created_at,
            updated_at: entrenador.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CrearEntrenadorRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre es obligatorio"))]
    pub nombre: String,

    #[validate(length(min = 1, max = 100, message = "El apellido es obligatorio"))]
    pub apellido: String,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,

    #[validate(length(max = 30))]
    pub telefono: Option<String>,

    #[validate(length(max = 255))]
    pub especialidad: Option<String>,

    pub activo: Option<bool>,

    #[serde(default)]
    #[validate]
    pub clases: Vec<ClaseEntrenador>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarEntrenadorRequest {
    #[validate(length(min = 1, max = 100))]
    pub nombre: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub apellido: Option<String>,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,

    #[validate(length(max = 30))]
    pub telefono: Option<String>,

    #[validate(length(max = 255))]
    pub especialidad: Option<String>,

    pub activo: Option<bool>,

    /// Replaces the whole class list when present
    pub clases: Option<Vec<ClaseEntrenador>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntrenadorFilter {
    pub activo: Option<bool>,
    pub especialidad: Option<String>,
    /// Matches name or surname
    pub buscar: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntrenadorListResponse {
    pub data: Vec<EntrenadorResponse>,
    pub paginacion: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clase(nombre: &str, horarios: Vec<(DiaSemana, &str, &str)>) -> ClaseEntrenador {
        ClaseEntrenador {
            nombre: nombre.to_string(),
            descripcion: None,
            capacidad_maxima: None,
            horarios: horarios
                .into_iter()
                .map(|(dia, inicio, fin)| Horario {
                    dia,
                    hora_inicio: inicio.to_string(),
                    hora_fin: fin.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_dia_parsing_accepts_accents() {
        assert_eq!("Miércoles".parse::<DiaSemana>(), Ok(DiaSemana::Miercoles));
        let dia: DiaSemana = serde_json::from_value(json!("sábado")).unwrap();
        assert_eq!(dia, DiaSemana::Sabado);
        assert_eq!(serde_json::to_value(dia).unwrap(), json!("sabado"));
        assert!("feriado".parse::<DiaSemana>().is_err());
    }

    #[test]
    fn test_clases_roundtrip_through_jsonb_value() {
        let value = json!([{
            "nombre": "Spinning",
            "horarios": [{"dia": "lunes", "hora_inicio": "07:00", "hora_fin": "08:00"}]
        }]);
        let clases: Vec<ClaseEntrenador> = serde_json::from_value(value).unwrap();
        assert_eq!(clases[0].capacidad(10), 10);
        assert!(clases[0].has_slot(DiaSemana::Lunes, "07:00", "08:00"));
        assert!(!clases[0].has_slot(DiaSemana::Lunes, "07:00", "09:00"));
    }

    #[test]
    fn test_validate_clases_rejects_duplicates() {
        let clases = vec![
            clase("Yoga", vec![(DiaSemana::Martes, "09:00", "10:00")]),
            clase(" yoga ", vec![]),
        ];
        assert!(validate_clases(&clases).is_err());

        let repeated_slot = vec![clase(
            "Pilates",
            vec![
                (DiaSemana::Jueves, "18:00", "19:00"),
                (DiaSemana::Jueves, "18:00", "19:00"),
            ],
        )];
        assert!(validate_clases(&repeated_slot).is_err());
    }

    #[test]
    fn test_validate_clases_rejects_inverted_slot() {
        let clases = vec![clase("Box", vec![(DiaSemana::Viernes, "20:00", "19:00")])];
        assert!(validate_clases(&clases).is_err());

        let ok = vec![clase("Box", vec![(DiaSemana::Viernes, "19:00", "20:00")])];
        assert!(validate_clases(&ok).is_ok());
    }

    #[test]
    fn test_normalize_fills_capacity() {
        let clases = normalize_clases(vec![clase("  Crossfit ", vec![])], 12);
        assert_eq!(clases[0].nombre, "Crossfit");
        assert_eq!(clases[0].capacidad_maxima, Some(12));
    }

    #[test]
    fn test_declares_slot_after_schedule_change() {
        let clases = vec![
            clase("Yoga", vec![(DiaSemana::Lunes, "08:00", "09:00")]),
            clase("Pilates", vec![(DiaSemana::Miercoles, "18:00", "19:00")]),
        ];
        assert!(declares_slot(&clases, "Yoga", "lunes", "08:00", "09:00"));
        assert!(!declares_slot(&clases, "Yoga", "miercoles", "18:00", "19:00"));
        assert!(!declares_slot(&clases, "yoga", "lunes", "08:00", "09:00"));
        assert!(!declares_slot(&clases, "Spinning", "lunes", "08:00", "09:00"));
    }

    #[test]
    fn test_nested_slot_validation() {
        let request: CrearEntrenadorRequest = serde_json::from_value(json!({
            "nombre": "Marta",
            "apellido": "Ruiz",
            "clases": [{
                "nombre": "HIIT",
                "capacidad_maxima": 0,
                "horarios": [{"dia": "lunes", "hora_inicio": "7:00", "hora_fin": "08:00"}]
            }]
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
