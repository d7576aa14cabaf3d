// Pago database model and the stock arithmetic shared by create/edit/delete

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::PageMeta;
use crate::schema::pagos;

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
pub enum MetodoPago {
    Efectivo,
    Tarjeta,
    Transferencia,
    Otro,
}

impl MetodoPago {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetodoPago::Efectivo => "efectivo",
            MetodoPago::Tarjeta => "tarjeta",
            MetodoPago::Transferencia => "transferencia",
            MetodoPago::Otro => "otro",
        }
    }
}

impl FromStr for MetodoPago {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "efectivo" => Ok(MetodoPago::Efectivo),
            "tarjeta" => Ok(MetodoPago::Tarjeta),
            "transferencia" => Ok(MetodoPago::Transferencia),
            "otro" => Ok(MetodoPago::Otro),
            _ => Err(format!("Método de pago inválido: {}", s)),
        }
    }
}

impl_text_sql!(MetodoPago);

pub const DEFAULT_CONCEPTO: &str = "Pago";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = pagos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Pago {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub producto_id: Option<Uuid>,
    pub cantidad: i32,
    pub monto: i64,
    pub metodo_pago: MetodoPago,
    pub concepto: String,
    pub fecha: NaiveDate,
    pub descripcion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pagos)]
pub struct NuevoPago {
    pub cliente_id: Uuid,
    pub producto_id: Option<Uuid>,
    pub cantidad: i32,
    pub monto: i64,
    pub metodo_pago: MetodoPago,
    pub concepto: String,
    pub fecha: NaiveDate,
    pub descripcion: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = pagos)]
#[diesel(treat_none_as_null = true)]
pub struct PagoChanges {
    pub cliente_id: Uuid,
    pub producto_id: Option<Uuid>,
    pub cantidad: i32,
    pub monto: i64,
    pub metodo_pago: MetodoPago,
    pub concepto: String,
    pub fecha: NaiveDate,
    pub descripcion: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CrearPagoRequest {
    pub cliente_id: Uuid,
    pub producto_id: Option<Uuid>,

    #[validate(range(min = 1, message = "La cantidad debe ser al menos 1"))]
    pub cantidad: Option<i32>,

    /// Defaults to price × quantity when a product is given
    #[validate(range(min = 0, message = "El monto no puede ser negativo"))]
    pub monto: Option<i64>,

    pub metodo_pago: MetodoPago,

    #[validate(length(min = 1, max = 255))]
    pub concepto: Option<String>,

    pub fecha: Option<NaiveDate>,
    pub descripcion: Option<String>,
}

/// Partial edit. `producto_id: null` detaches the product.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarPagoRequest {
    pub cliente_id: Option<Uuid>,

    #[serde(default, deserialize_with = "crate::models::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub producto_id: Option<Option<Uuid>>,

    #[validate(range(min = 1, message = "La cantidad debe ser al menos 1"))]
    pub cantidad: Option<i32>,

    #[validate(range(min = 0, message = "El monto no puede ser negativo"))]
    pub monto: Option<i64>,

    pub metodo_pago: Option<MetodoPago>,

    #[validate(length(min = 1, max = 255))]
    pub concepto: Option<String>,

    pub fecha: Option<NaiveDate>,
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PagoFilter {
    pub cliente_id: Option<Uuid>,
    pub metodo_pago: Option<MetodoPago>,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct TotalPorMetodo {
    pub metodo_pago: MetodoPago,
    pub total: i64,
    pub cantidad: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PagoListResponse {
    pub data: Vec<Pago>,
    pub paginacion: PageMeta,
    /// Sum of `monto` over every payment matching the filter
    pub total: i64,
    pub totales_por_metodo: Vec<TotalPorMetodo>,
}

/// Grouped row from the per-method totals query
#[derive(Debug, QueryableByName)]
pub struct MetodoTotalRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub metodo_pago: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub total: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub cantidad: i64,
}

/// Amount charged: explicit `monto` wins, otherwise price × quantity
pub fn resolve_monto(monto: Option<i64>, precio: Option<i64>, cantidad: i32) -> Result<i64, String> {
    match (monto, precio) {
        (Some(monto), _) => Ok(monto),
        (None, Some(precio)) => precio
            .checked_mul(i64::from(cantidad))
            .ok_or_else(|| "El monto calculado excede el máximo permitido".to_string()),
        (None, None) => Err("El monto es obligatorio cuando no se indica un producto".to_string()),
    }
}

/// Stock movement for one product. Positive restores, negative consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub producto_id: Uuid,
    pub delta: i32,
}

/// Stock movements needed to go from the old (product, quantity) pair to
/// the new one. Restores are listed before consumptions; a same-product
/// edit collapses to its net delta.
pub fn plan_stock_adjustment(
    old: (Option<Uuid>, i32),
    new: (Option<Uuid>, i32),
) -> Vec<StockChange> {
    let mut changes = Vec::new();
    match (old.0, new.0) {
        (Some(old_id), Some(new_id)) if old_id == new_id => {
            let delta = old.1 - new.1;
            if delta != 0 {
                changes.push(StockChange {
                    producto_id: old_id,
                    delta,
                });
            }
        },
        (old_product, new_product) => {
            if let Some(producto_id) = old_product {
                changes.push(StockChange {
                    producto_id,
                    delta: old.1,
                });
            }
            if let Some(producto_id) = new_product {
                changes.push(StockChange {
                    producto_id,
                    delta: -new.1,
                });
            }
        },
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_monto() {
        assert_eq!(resolve_monto(Some(500), Some(100), 3), Ok(500));
        assert_eq!(resolve_monto(None, Some(2500), 3), Ok(7500));
        assert!(resolve_monto(None, None, 1).is_err());
        assert!(resolve_monto(None, Some(i64::MAX), 2).is_err());
    }

    #[test]
    fn test_plan_same_product() {
        let p = Uuid::new_v4();
        assert_eq!(
            plan_stock_adjustment((Some(p), 3), (Some(p), 5)),
            vec![StockChange { producto_id: p, delta: -2 }]
        );
        assert_eq!(
            plan_stock_adjustment((Some(p), 5), (Some(p), 1)),
            vec![StockChange { producto_id: p, delta: 4 }]
        );
        assert!(plan_stock_adjustment((Some(p), 2), (Some(p), 2)).is_empty());
    }

    #[test]
    fn test_plan_product_swap() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(
            plan_stock_adjustment((Some(a), 2), (Some(b), 4)),
            vec![
                StockChange { producto_id: a, delta: 2 },
                StockChange { producto_id: b, delta: -4 },
            ]
        );
    }

    #[test]
    fn test_plan_attach_and_detach() {
        let p = Uuid::new_v4();
        assert_eq!(
            plan_stock_adjustment((None, 1), (Some(p), 3)),
            vec![StockChange { producto_id: p, delta: -3 }]
        );
        assert_eq!(
            plan_stock_adjustment((Some(p), 3), (None, 3)),
            vec![StockChange { producto_id: p, delta: 3 }]
        );
        assert!(plan_stock_adjustment((None, 1), (None, 2)).is_empty());
    }

    #[test]
    fn test_detach_product_in_update_request() {
        let request: ActualizarPagoRequest =
            serde_json::from_value(serde_json::json!({ "producto_id": null })).unwrap();
        assert_eq!(request.producto_id, Some(None));

        let request: ActualizarPagoRequest =
            serde_json::from_value(serde_json::json!({ "cantidad": 2 })).unwrap();
        assert_eq!(request.producto_id, None);
    }
}
