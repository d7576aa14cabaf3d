// Transaccion (ledger) database model

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::PageMeta;
use crate::schema::transacciones;

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
pub enum TipoTransaccion {
    Ingreso,
    Egreso,
}

impl TipoTransaccion {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoTransaccion::Ingreso => "ingreso",
            TipoTransaccion::Egreso => "egreso",
        }
    }
}

impl FromStr for TipoTransaccion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ingreso" => Ok(TipoTransaccion::Ingreso),
            "egreso" => Ok(TipoTransaccion::Egreso),
            _ => Err(format!("Tipo de transacción inválido: {}", s)),
        }
    }
}

impl_text_sql!(TipoTransaccion);

pub const DEFAULT_CATEGORIA: &str = "general";
/// Category of ledger rows generated from payments
pub const CATEGORIA_PAGO: &str = "pago";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = transacciones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Transaccion {
    pub id: Uuid,
    pub tipo: TipoTransaccion,
    pub categoria: String,
    pub descripcion: Option<String>,
    pub monto: i64,
    pub fecha: NaiveDate,
    pub pago_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaccion {
    /// Rows generated from a payment follow that payment
    pub fn is_payment_generated(&self) -> bool {
        self.pago_id.is_some()
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = transacciones)]
pub struct NuevaTransaccion {
    pub tipo: TipoTransaccion,
    pub categoria: String,
    pub descripcion: Option<String>,
    pub monto: i64,
    pub fecha: NaiveDate,
    pub pago_id: Option<Uuid>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = transacciones)]
pub struct TransaccionUpdate {
    pub tipo: Option<TipoTransaccion>,
    pub categoria: Option<String>,
    pub descripcion: Option<Option<String>>,
    pub monto: Option<i64>,
    pub fecha: Option<NaiveDate>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CrearTransaccionRequest {
    pub tipo: TipoTransaccion,

    #[validate(length(min = 1, max = 100))]
    pub categoria: Option<String>,

    pub descripcion: Option<String>,

    #[validate(range(min = 1, message = "El monto debe ser mayor que cero"))]
    pub monto: i64,

    pub fecha: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarTransaccionRequest {
    pub tipo: Option<TipoTransaccion>,

    #[validate(length(min = 1, max = 100))]
    pub categoria: Option<String>,

    pub descripcion: Option<String>,

    #[validate(range(min = 1, message = "El monto debe ser mayor que cero"))]
    pub monto: Option<i64>,

    pub fecha: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransaccionFilter {
    /// Inclusive lower bound
    pub desde: Option<NaiveDate>,
    /// Inclusive upper bound
    pub hasta: Option<NaiveDate>,
    pub tipo: Option<TipoTransaccion>,
    pub categoria: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, ToSchema)]
pub struct Totales {
    pub total_ingresos: i64,
    pub total_egresos: i64,
    pub balance: i64,
}

impl Totales {
    pub fn new(total_ingresos: i64, total_egresos: i64) -> Self {
        Self {
            total_ingresos,
            total_egresos,
            balance: total_ingresos - total_egresos,
        }
    }

    /// Fold the `GROUP BY tipo` rows into totals
    pub fn from_rows(rows: &[TipoTotalRow]) -> Self {
        let sum_for = |tipo: TipoTransaccion| {
            rows.iter()
                .filter(|row| row.tipo == tipo.as_str())
                .map(|row| row.total)
                .sum::<i64>()
        };
        Self::new(sum_for(TipoTransaccion::Ingreso), sum_for(TipoTransaccion::Egreso))
    }
}

#[derive(Debug, QueryableByName)]
pub struct TipoTotalRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub tipo: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransaccionListResponse {
    pub data: Vec<Transaccion>,
    pub paginacion: PageMeta,
    pub total_ingresos: i64,
    pub total_egresos: i64,
    pub balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResumenContable {
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
    pub total_ingresos: i64,
    pub total_egresos: i64,
    pub balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totales_from_rows() {
        let rows = vec![
            TipoTotalRow {
                tipo: "ingreso".to_string(),
                total: 15000,
            },
            TipoTotalRow {
                tipo: "egreso".to_string(),
                total: 4000,
            },
        ];
        assert_eq!(Totales::from_rows(&rows), Totales::new(15000, 4000));
        assert_eq!(Totales::from_rows(&rows).balance, 11000);
    }

    #[test]
    fn test_totales_empty_and_negative_balance() {
        assert_eq!(Totales::from_rows(&[]), Totales::default());

        let rows = vec![TipoTotalRow {
            tipo: "egreso".to_string(),
            total: 700,
        }];
        assert_eq!(Totales::from_rows(&rows).balance, -700);
    }

    #[test]
    fn test_monto_must_be_positive() {
        let request = CrearTransaccionRequest {
            tipo: TipoTransaccion::Egreso,
            categoria: None,
            descripcion: None,
            monto: 0,
            fecha: None,
        };
        assert!(request.validate().is_err());
    }
}
