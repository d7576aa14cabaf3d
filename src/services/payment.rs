// Payments, product stock and the ledger rows they generate
// Every write runs in one transaction so payment, stock and ledger move together.

use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Date, Nullable, Text};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    middleware::AuthenticatedUser,
    models::{
        payment::{
            plan_stock_adjustment, resolve_monto, ActualizarPagoRequest, CrearPagoRequest,
            MetodoTotalRow, NuevoPago, Pago, PagoChanges, PagoFilter, PagoListResponse,
            StockChange, TotalPorMetodo, DEFAULT_CONCEPTO,
        },
        product::Producto,
        transaction::{NuevaTransaccion, TipoTransaccion, TransaccionUpdate, CATEGORIA_PAGO},
        Pagination,
    },
    schema::{clientes, pagos, productos, transacciones},
    utils::{trim_optional_field, validate_date_range, AuditAction, AuditLogger, ServiceError},
};

const TOTALS_BY_METHOD_SQL: &str = "\
    SELECT metodo_pago, COALESCE(SUM(monto), 0)::BIGINT AS total, COUNT(*) AS cantidad \
    FROM pagos \
    WHERE ($1::uuid IS NULL OR cliente_id = $1) \
      AND ($2::text IS NULL OR metodo_pago = $2) \
      AND ($3::date IS NULL OR fecha >= $3) \
      AND ($4::date IS NULL OR fecha <= $4) \
    GROUP BY metodo_pago \
    ORDER BY metodo_pago";

pub struct PaymentService {
    diesel_pool: DieselPool,
}

fn filtered(filter: &PagoFilter) -> pagos::BoxedQuery<'static, Pg> {
    let mut query = pagos::table.into_boxed();

    if let Some(cliente_id) = filter.cliente_id {
        query = query.filter(pagos::cliente_id.eq(cliente_id));
    }
    if let Some(metodo) = filter.metodo_pago {
        query = query.filter(pagos::metodo_pago.eq(metodo));
    }
    if let Some(desde) = filter.desde {
        query = query.filter(pagos::fecha.ge(desde));
    }
    if let Some(hasta) = filter.hasta {
        query = query.filter(pagos::fecha.le(hasta));
    }
    query
}

async fn ensure_client_exists(conn: &mut AsyncPgConnection, id: Uuid) -> Result<(), ServiceError> {
    clientes::table
        .find(id)
        .select(clientes::id)
        .first::<Uuid>(conn)
        .await
        .optional()?
        .map(|_| ())
        .ok_or_else(|| ServiceError::not_found("Cliente"))
}

/// Load a product that is about to be sold
async fn sellable_product(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Producto, ServiceError> {
    let producto = productos::table
        .find(id)
        .select(Producto::as_select())
        .first::<Producto>(conn)
        .await
        .optional()?
        .ok_or_else(|| ServiceError::not_found("Producto"))?;

    if !producto.activo {
        return Err(ServiceError::ValidationError(format!(
            "El producto '{}' no está activo",
            producto.nombre
        )));
    }
    Ok(producto)
}

/// Apply one stock movement. Consumption only succeeds while enough stock is left.
async fn apply_stock_change(
    conn: &mut AsyncPgConnection,
    change: StockChange,
) -> Result<(), ServiceError> {
    if change.delta >= 0 {
        let updated = diesel::update(productos::table.find(change.producto_id))
            .set((
                productos::stock.eq(productos::stock + change.delta),
                productos::updated_at.eq(Utc::now()),
            ))
            .execute(conn)
            .await?;
        if updated == 0 {
            warn!(producto_id = %change.producto_id, "Stock restore skipped, product no longer exists");
        }
        return Ok(());
    }

    let needed = -change.delta;
    let updated = diesel::update(
        productos::table
            .filter(productos::id.eq(change.producto_id))
            .filter(productos::stock.ge(needed)),
    )
    .set((
        productos::stock.eq(productos::stock - needed),
        productos::updated_at.eq(Utc::now()),
    ))
    .execute(conn)
    .await?;

    if updated == 0 {
        let stock = productos::table
            .find(change.producto_id)
            .select(productos::stock)
            .first::<i32>(conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Producto"))?;

        return Err(ServiceError::InsufficientStock(format!(
            "Stock insuficiente: disponible {}, solicitado {}",
            stock, needed
        )));
    }
    Ok(())
}

impl PaymentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: PagoFilter) -> Result<PagoListResponse, ServiceError> {
        validate_date_range(filter.desde, filter.hasta).map_err(ServiceError::ValidationError)?;

        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let count = filtered(&filter).count().get_result::<i64>(&mut conn).await?;
        let data = filtered(&filter)
            .order((pagos::fecha.desc(), pagos::created_at.desc()))
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(Pago::as_select())
            .load::<Pago>(&mut conn)
            .await?;

        let rows = diesel::sql_query(TOTALS_BY_METHOD_SQL)
            .bind::<Nullable<diesel::sql_types::Uuid>, _>(filter.cliente_id)
            .bind::<Nullable<Text>, _>(filter.metodo_pago.map(|m| m.as_str()))
            .bind::<Nullable<Date>, _>(filter.desde)
            .bind::<Nullable<Date>, _>(filter.hasta)
            .load::<MetodoTotalRow>(&mut conn)
            .await?;

        let totales_por_metodo = rows
            .into_iter()
            .map(|row| {
                Ok(TotalPorMetodo {
                    metodo_pago: row.metodo_pago.parse().map_err(ServiceError::InternalError)?,
                    total: row.total,
                    cantidad: row.cantidad,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;
        let total = totales_por_metodo.iter().map(|t| t.total).sum();

        Ok(PagoListResponse {
            data,
            paginacion: pagination.meta(count),
            total,
            totales_por_metodo,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Pago, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        pagos::table
            .find(id)
            .select(Pago::as_select())
            .first::<Pago>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Pago"))
    }

    /// Record a payment, consume product stock and add its income row
    #[instrument(skip(self, actor, request), fields(cliente_id = %request.cliente_id))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CrearPagoRequest,
    ) -> Result<Pago, ServiceError> {
        request.validate()?;

        let mut conn = self.diesel_pool.get().await?;
        let pago = conn
            .transaction::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    ensure_client_exists(conn, request.cliente_id).await?;

                    let cantidad = request.cantidad.unwrap_or(1);
                    let precio = match request.producto_id {
                        Some(producto_id) => {
                            let producto = sellable_product(conn, producto_id).await?;
                            apply_stock_change(
                                conn,
                                StockChange {
                                    producto_id,
                                    delta: -cantidad,
                                },
                            )
                            .await?;
                            Some(producto.precio)
                        },
                        None => None,
                    };

                    let monto = resolve_monto(request.monto, precio, cantidad)
                        .map_err(ServiceError::ValidationError)?;

                    let nuevo = NuevoPago {
                        cliente_id: request.cliente_id,
                        producto_id: request.producto_id,
                        cantidad,
                        monto,
                        metodo_pago: request.metodo_pago,
                        concepto: trim_optional_field(request.concepto.as_ref())
                            .unwrap_or_else(|| DEFAULT_CONCEPTO.to_string()),
                        fecha: request.fecha.unwrap_or_else(|| Utc::now().date_naive()),
                        descripcion: trim_optional_field(request.descripcion.as_ref()),
                    };

                    let pago = diesel::insert_into(pagos::table)
                        .values(&nuevo)
                        .returning(Pago::as_returning())
                        .get_result::<Pago>(conn)
                        .await?;

                    diesel::insert_into(transacciones::table)
                        .values(&NuevaTransaccion {
                            tipo: TipoTransaccion::Ingreso,
                            categoria: CATEGORIA_PAGO.to_string(),
                            descripcion: Some(pago.concepto.clone()),
                            monto: pago.monto,
                            fecha: pago.fecha,
                            pago_id: Some(pago.id),
                        })
                        .execute(conn)
                        .await?;

                    Ok(pago)
                })
            })
            .await?;

        info!(pago_id = %pago.id, monto = pago.monto, "Payment recorded");
        AuditLogger::resource(AuditAction::Created, actor.id, "pago", pago.id);
        Ok(pago)
    }

    /// Edit a payment. Stock is rebalanced and the linked income row follows.
    #[instrument(skip(self, actor, request))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: ActualizarPagoRequest,
    ) -> Result<Pago, ServiceError> {
        request.validate()?;

        let mut conn = self.diesel_pool.get().await?;
        let pago = conn
            .transaction::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    let actual = pagos::table
                        .find(id)
                        .for_update()
                        .select(Pago::as_select())
                        .first::<Pago>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| ServiceError::not_found("Pago"))?;

                    let cliente_id = request.cliente_id.unwrap_or(actual.cliente_id);
                    if cliente_id != actual.cliente_id {
                        ensure_client_exists(conn, cliente_id).await?;
                    }

                    let producto_id = request.producto_id.unwrap_or(actual.producto_id);
                    let cantidad = request.cantidad.unwrap_or(actual.cantidad);
                    let producto_cambia = producto_id != actual.producto_id;

                    // Price is only needed when the amount has to be recomputed
                    let precio = match producto_id {
                        Some(pid) if producto_cambia => Some(sellable_product(conn, pid).await?.precio),
                        Some(pid) if cantidad != actual.cantidad && request.monto.is_none() => {
                            productos::table
                                .find(pid)
                                .select(productos::precio)
                                .first::<i64>(conn)
                                .await
                                .optional()?
                        },
                        _ => None,
                    };

                    for change in plan_stock_adjustment(
                        (actual.producto_id, actual.cantidad),
                        (producto_id, cantidad),
                    ) {
                        apply_stock_change(conn, change).await?;
                    }

                    let monto = match (request.monto, precio) {
                        (Some(monto), _) => monto,
                        (None, Some(_)) => resolve_monto(None, precio, cantidad)
                            .map_err(ServiceError::ValidationError)?,
                        (None, None) => actual.monto,
                    };

                    let changes = PagoChanges {
                        cliente_id,
                        producto_id,
                        cantidad,
                        monto,
                        metodo_pago: request.metodo_pago.unwrap_or(actual.metodo_pago),
                        concepto: trim_optional_field(request.concepto.as_ref())
                            .unwrap_or(actual.concepto),
                        fecha: request.fecha.unwrap_or(actual.fecha),
                        descripcion: match request.descripcion {
                            Some(ref d) => trim_optional_field(Some(d)),
                            None => actual.descripcion,
                        },
                        updated_at: Utc::now(),
                    };

                    let pago = diesel::update(pagos::table.find(id))
                        .set(&changes)
                        .returning(Pago::as_returning())
                        .get_result::<Pago>(conn)
                        .await?;

                    let ledger_rows = diesel::update(
                        transacciones::table.filter(transacciones::pago_id.eq(pago.id)),
                    )
                    .set(&TransaccionUpdate {
                        descripcion: Some(Some(pago.concepto.clone())),
                        monto: Some(pago.monto),
                        fecha: Some(pago.fecha),
                        updated_at: Some(Utc::now()),
                        ..Default::default()
                    })
                    .execute(conn)
                    .await?;

                    if ledger_rows == 0 {
                        warn!(pago_id = %pago.id, "Income row missing for payment, recreating");
                        diesel::insert_into(transacciones::table)
                            .values(&NuevaTransaccion {
                                tipo: TipoTransaccion::Ingreso,
                                categoria: CATEGORIA_PAGO.to_string(),
                                descripcion: Some(pago.concepto.clone()),
                                monto: pago.monto,
                                fecha: pago.fecha,
                                pago_id: Some(pago.id),
                            })
                            .execute(conn)
                            .await?;
                    }

                    Ok(pago)
                })
            })
            .await?;

        AuditLogger::resource(AuditAction::Updated, actor.id, "pago", id);
        Ok(pago)
    }

    /// Remove a payment, give its units back to stock and drop its income row
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.diesel_pool.get().await?;

        conn.transaction::<_, ServiceError, _>(|conn| {
            Box::pin(async move {
                let pago = pagos::table
                    .find(id)
                    .for_update()
                    .select(Pago::as_select())
                    .first::<Pago>(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| ServiceError::not_found("Pago"))?;

                if let Some(producto_id) = pago.producto_id {
                    apply_stock_change(
                        conn,
                        StockChange {
                            producto_id,
                            delta: pago.cantidad,
                        },
                    )
                    .await?;
                }

                diesel::delete(transacciones::table.filter(transacciones::pago_id.eq(id)))
                    .execute(conn)
                    .await?;
                diesel::delete(pagos::table.find(id)).execute(conn).await?;
                Ok(())
            })
        })
        .await?;

        info!(pago_id = %id, "Payment deleted");
        AuditLogger::resource(AuditAction::Deleted, actor.id, "pago", id);
        Ok(())
    }
}
