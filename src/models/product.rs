// Producto database model

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::PageMeta;
use crate::schema::productos;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = productos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Producto {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    /// Unit price in the smallest currency unit
    pub precio: i64,
    pub stock: i32,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = productos)]
pub struct NuevoProducto {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: i64,
    pub stock: i32,
    pub activo: bool,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = productos)]
pub struct ProductoUpdate {
    pub nombre: Option<String>,
    pub descripcion: Option<Option<String>>,
    pub precio: Option<i64>,
    pub stock: Option<i32>,
    pub activo: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CrearProductoRequest {
    #[validate(length(min = 1, max = 255, message = "El nombre es obligatorio"))]
    pub nombre: String,

    pub descripcion: Option<String>,

    #[validate(range(min = 0, message = "El precio no puede ser negativo"))]
    pub precio: i64,

    #[validate(range(min = 0, message = "El stock no puede ser negativo"))]
    pub stock: Option<i32>,

    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ActualizarProductoRequest {
    #[validate(length(min = 1, max = 255))]
    pub nombre: Option<String>,

    pub descripcion: Option<String>,

    #[validate(range(min = 0, message = "El precio no puede ser negativo"))]
    pub precio: Option<i64>,

    #[validate(range(min = 0, message = "El stock no puede ser negativo"))]
    pub stock: Option<i32>,

    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductoFilter {
    pub activo: Option<bool>,
    pub buscar: Option<String>,
    /// Only products with stock at or below this value
    pub stock_maximo: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductoListResponse {
    pub data: Vec<Producto>,
    pub paginacion: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_values_rejected() {
        let request = CrearProductoRequest {
            nombre: "Proteína".to_string(),
            descripcion: None,
            precio: -100,
            stock: Some(-1),
            activo: None,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("precio"));
        assert!(errors.field_errors().contains_key("stock"));
    }
}
