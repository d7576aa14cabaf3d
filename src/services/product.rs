// Product catalogue and stock levels
// Stock is moved by payments through conditional updates in services::payment;
// this service only sets it directly on create and edit.

use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    middleware::AuthenticatedUser,
    models::{
        product::{
            ActualizarProductoRequest, CrearProductoRequest, NuevoProducto, Producto,
            ProductoFilter, ProductoListResponse, ProductoUpdate,
        },
        Pagination,
    },
    schema::productos,
    utils::{trim_and_validate_field, trim_optional_field, AuditAction, AuditLogger, ServiceError},
};

pub struct ProductService {
    diesel_pool: DieselPool,
}

fn filtered(filter: &ProductoFilter) -> productos::BoxedQuery<'static, Pg> {
    let mut query = productos::table.into_boxed();

    if let Some(activo) = filter.activo {
        query = query.filter(productos::activo.eq(activo));
    }
    if let Some(ref buscar) = filter.buscar {
        query = query.filter(productos::nombre.ilike(format!("%{}%", buscar.trim())));
    }
    if let Some(stock_maximo) = filter.stock_maximo {
        query = query.filter(productos::stock.le(stock_maximo));
    }
    query
}

impl ProductService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: ProductoFilter) -> Result<ProductoListResponse, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let total = filtered(&filter).count().get_result::<i64>(&mut conn).await?;
        let data = filtered(&filter)
            .order(productos::nombre.asc())
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(Producto::as_select())
            .load::<Producto>(&mut conn)
            .await?;

        Ok(ProductoListResponse {
            data,
            paginacion: pagination.meta(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Producto, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        productos::table
            .find(id)
            .select(Producto::as_select())
            .first::<Producto>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Producto"))
    }

    #[instrument(skip(self, actor, request))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CrearProductoRequest,
    ) -> Result<Producto, ServiceError> {
        request.validate()?;

        let nuevo = NuevoProducto {
            nombre: trim_and_validate_field(&request.nombre, true)
                .map_err(ServiceError::ValidationError)?,
            descripcion: trim_optional_field(request.descripcion.as_ref()),
            precio: request.precio,
            stock: request.stock.unwrap_or(0),
            activo: request.activo.unwrap_or(true),
        };

        let mut conn = self.diesel_pool.get().await?;
        let producto = diesel::insert_into(productos::table)
            .values(&nuevo)
            .returning(Producto::as_returning())
            .get_result(&mut conn)
            .await?;

        AuditLogger::resource(AuditAction::Created, actor.id, "producto", producto.id);
        Ok(producto)
    }

    #[instrument(skip(self, actor, request))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: ActualizarProductoRequest,
    ) -> Result<Producto, ServiceError> {
        request.validate()?;

        let nombre = match request.nombre {
            Some(ref nombre) => {
                Some(trim_and_validate_field(nombre, true).map_err(ServiceError::ValidationError)?)
            },
            None => None,
        };

        let changes = ProductoUpdate {
            nombre,
            descripcion: request
                .descripcion
                .as_ref()
                .map(|d| trim_optional_field(Some(d))),
            precio: request.precio,
            stock: request.stock,
            activo: request.activo,
            updated_at: Some(Utc::now()),
        };

        let mut conn = self.diesel_pool.get().await?;
        let producto = diesel::update(productos::table.find(id))
            .set(&changes)
            .returning(Producto::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Producto"))?;

        AuditLogger::resource(AuditAction::Updated, actor.id, "producto", id);
        Ok(producto)
    }

    /// Past payments keep their amount; their product reference is cleared
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let deleted = diesel::delete(productos::table.find(id))
            .execute(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(ServiceError::not_found("Producto"));
        }

        AuditLogger::resource(AuditAction::Deleted, actor.id, "producto", id);
        Ok(())
    }
}
