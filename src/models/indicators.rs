// Dashboard indicators

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

/// Days ahead counted as "expiring soon" for memberships
pub const DIAS_AVISO_VENCIMIENTO: i64 = 7;

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct Indicadores {
    pub fecha: NaiveDate,
    pub clientes_activos: i64,
    pub clientes_nuevos_mes: i64,
    pub membresias_por_vencer: i64,
    pub ingresos_mes: i64,
    pub egresos_mes: i64,
    pub balance_mes: i64,
    pub asistencias_hoy: i64,
    pub sesiones_abiertas: i64,
    pub entrenadores_activos: i64,
    pub rutinas_activas: i64,
}

/// First and last day of the month containing `day`
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month
        .map(|next| next - Duration::days(1))
        .unwrap_or(first);
    (first, last)
}

/// Inclusive window for memberships expiring soon
pub fn expiry_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today, today + Duration::days(DIAS_AVISO_VENCIMIENTO))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(date("2025-02-14")),
            (date("2025-02-01"), date("2025-02-28"))
        );
        assert_eq!(
            month_bounds(date("2024-02-29")),
            (date("2024-02-01"), date("2024-02-29"))
        );
        assert_eq!(
            month_bounds(date("2025-12-31")),
            (date("2025-12-01"), date("2025-12-31"))
        );
    }

    #[test]
    fn test_expiry_window() {
        assert_eq!(
            expiry_window(date("2025-03-28")),
            (date("2025-03-28"), date("2025-04-04"))
        );
    }
}
