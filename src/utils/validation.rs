// Validation utilities shared by request DTOs and services

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// 24h time of day, "HH:MM"
    static ref HORA_REGEX: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap();
}

/// Trim and validate string fields
///
/// # Returns
/// * `Ok(String)` - The trimmed string if valid
/// * `Err(String)` - Error message if a required field is blank
pub fn trim_and_validate_field(field: &str, required: bool) -> Result<String, String> {
    let trimmed = field.trim().to_string();
    if trimmed.is_empty() && required {
        Err("El campo no puede estar vacío".to_string())
    } else {
        Ok(trimmed)
    }
}

/// Trim an optional field, collapsing blank values to `None`
pub fn trim_optional_field(field: Option<&String>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_hora(value: &str) -> bool {
    HORA_REGEX.is_match(value)
}

/// `validator` custom hook for "HH:MM" fields
pub fn validate_hora(value: &str) -> Result<(), validator::ValidationError> {
    if is_valid_hora(value) {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("hora_invalida");
        error.message = Some("La hora debe tener formato HH:MM".into());
        Err(error)
    }
}

/// Minutes since midnight for a valid "HH:MM" string
pub fn hora_to_minutes(value: &str) -> Option<u32> {
    if !is_valid_hora(value) {
        return None;
    }
    let (hours, minutes) = value.split_once(':')?;
    Some(hours.parse::<u32>().ok()? * 60 + minutes.parse::<u32>().ok()?)
}

/// Check that a slot starts strictly before it ends
pub fn validate_time_range(hora_inicio: &str, hora_fin: &str) -> Result<(), String> {
    match (hora_to_minutes(hora_inicio), hora_to_minutes(hora_fin)) {
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(_), Some(_)) => Err(format!(
            "La hora de inicio ({}) debe ser anterior a la hora de fin ({})",
            hora_inicio, hora_fin
        )),
        _ => Err("Las horas deben tener formato HH:MM".to_string()),
    }
}

/// Inclusive day range check used by list filters
pub fn validate_date_range(desde: Option<NaiveDate>, hasta: Option<NaiveDate>) -> Result<(), String> {
    match (desde, hasta) {
        (Some(desde), Some(hasta)) if desde > hasta => Err(format!(
            "La fecha 'desde' ({}) no puede ser posterior a 'hasta' ({})",
            desde, hasta
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_fields() {
        assert_eq!(trim_and_validate_field("  Ana ", true), Ok("Ana".to_string()));
        assert!(trim_and_validate_field("   ", true).is_err());
        assert_eq!(trim_and_validate_field("   ", false), Ok(String::new()));
        assert_eq!(trim_optional_field(Some(&"  ".to_string())), None);
        assert_eq!(
            trim_optional_field(Some(&" calle 5 ".to_string())),
            Some("calle 5".to_string())
        );
    }

    #[test]
    fn test_hora_format() {
        assert!(is_valid_hora("07:30"));
        assert!(is_valid_hora("23:59"));
        assert!(!is_valid_hora("24:00"));
        assert!(!is_valid_hora("7:30"));
        assert!(!is_valid_hora("07:60"));
        assert_eq!(hora_to_minutes("18:15"), Some(18 * 60 + 15));
    }

    #[test]
    fn test_time_range() {
        assert!(validate_time_range("08:00", "09:00").is_ok());
        assert!(validate_time_range("09:00", "09:00").is_err());
        assert!(validate_time_range("10:00", "09:00").is_err());
        assert!(validate_time_range("10:00", "9am").is_err());
    }

    #[test]
    fn test_date_range() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert!(validate_date_range(Some(jan), Some(feb)).is_ok());
        assert!(validate_date_range(Some(jan), Some(jan)).is_ok());
        assert!(validate_date_range(Some(feb), Some(jan)).is_err());
        assert!(validate_date_range(None, Some(jan)).is_ok());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Gym.COM "), "ana@gym.com");
    }
}
