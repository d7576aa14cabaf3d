// Ledger entries and income/expense totals

use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Date, Nullable, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    middleware::AuthenticatedUser,
    models::{
        transaction::{
            ActualizarTransaccionRequest, CrearTransaccionRequest, NuevaTransaccion,
            ResumenContable, TipoTotalRow, Totales, Transaccion, TransaccionFilter,
            TransaccionListResponse, TransaccionUpdate, DEFAULT_CATEGORIA,
        },
        Pagination,
    },
    schema::transacciones,
    utils::{trim_optional_field, validate_date_range, AuditAction, AuditLogger, ServiceError},
};

// Same predicates as `filtered`, evaluated once per request
const TOTALS_BY_TYPE_SQL: &str = "\
    SELECT tipo, COALESCE(SUM(monto), 0)::BIGINT AS total \
    FROM transacciones \
    WHERE ($1::date IS NULL OR fecha >= $1) \
      AND ($2::date IS NULL OR fecha <= $2) \
      AND ($3::text IS NULL OR tipo = $3) \
      AND ($4::text IS NULL OR categoria = $4) \
    GROUP BY tipo";

pub struct AccountingService {
    diesel_pool: DieselPool,
}

fn filtered(filter: &TransaccionFilter) -> transacciones::BoxedQuery<'static, Pg> {
    let mut query = transacciones::table.into_boxed();

    if let Some(desde) = filter.desde {
        query = query.filter(transacciones::fecha.ge(desde));
    }
    if let Some(hasta) = filter.hasta {
        query = query.filter(transacciones::fecha.le(hasta));
    }
    if let Some(tipo) = filter.tipo {
        query = query.filter(transacciones::tipo.eq(tipo));
    }
    if let Some(ref categoria) = filter.categoria {
        query = query.filter(transacciones::categoria.eq(categoria.trim().to_string()));
    }
    query
}

pub(crate) async fn totals(
    conn: &mut AsyncPgConnection,
    filter: &TransaccionFilter,
) -> Result<Totales, ServiceError> {
    let rows = diesel::sql_query(TOTALS_BY_TYPE_SQL)
        .bind::<Nullable<Date>, _>(filter.desde)
        .bind::<Nullable<Date>, _>(filter.hasta)
        .bind::<Nullable<Text>, _>(filter.tipo.map(|t| t.as_str()))
        .bind::<Nullable<Text>, _>(filter.categoria.as_ref().map(|c| c.trim().to_string()))
        .load::<TipoTotalRow>(conn)
        .await?;

    Ok(Totales::from_rows(&rows))
}

fn reject_payment_generated(transaccion: &Transaccion) -> Result<(), ServiceError> {
    if transaccion.is_payment_generated() {
        return Err(ServiceError::Conflict(
            "La transacción fue generada por un pago; modifique o elimine el pago".to_string(),
        ));
    }
    Ok(())
}

impl AccountingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    /// Page of ledger rows plus totals over the whole filtered set
    #[instrument(skip(self))]
    pub async fn list(&self, filter: TransaccionFilter) -> Result<TransaccionListResponse, ServiceError> {
        validate_date_range(filter.desde, filter.hasta).map_err(ServiceError::ValidationError)?;

        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let count = filtered(&filter).count().get_result::<i64>(&mut conn).await?;
        let data = filtered(&filter)
            .order((transacciones::fecha.desc(), transacciones::created_at.desc()))
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(Transaccion::as_select())
            .load::<Transaccion>(&mut conn)
            .await?;

        let totales = totals(&mut conn, &filter).await?;

        Ok(TransaccionListResponse {
            data,
            paginacion: pagination.meta(count),
            total_ingresos: totales.total_ingresos,
            total_egresos: totales.total_egresos,
            balance: totales.balance,
        })
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, filter: TransaccionFilter) -> Result<ResumenContable, ServiceError> {
        validate_date_range(filter.desde, filter.hasta).map_err(ServiceError::ValidationError)?;

        let mut conn = self.diesel_pool.get().await?;
        let totales = totals(&mut conn, &filter).await?;

        Ok(ResumenContable {
            desde: filter.desde,
            hasta: filter.hasta,
            total_ingresos: totales.total_ingresos,
            total_egresos: totales.total_egresos,
            balance: totales.balance,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Transaccion, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        Self::find(&mut conn, id).await
    }

    #[instrument(skip(self, actor, request))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CrearTransaccionRequest,
    ) -> Result<Transaccion, ServiceError> {
        request.validate()?;

        let nueva = NuevaTransaccion {
            tipo: request.tipo,
            categoria: trim_optional_field(request.categoria.as_ref())
                .unwrap_or_else(|| DEFAULT_CATEGORIA.to_string()),
            descripcion: trim_optional_field(request.descripcion.as_ref()),
            monto: request.monto,
            fecha: request.fecha.unwrap_or_else(|| Utc::now().date_naive()),
            pago_id: None,
        };

        let mut conn = self.diesel_pool.get().await?;
        let transaccion = diesel::insert_into(transacciones::table)
            .values(&nueva)
            .returning(Transaccion::as_returning())
            .get_result(&mut conn)
            .await?;

        AuditLogger::resource(AuditAction::Created, actor.id, "transaccion", transaccion.id);
        Ok(transaccion)
    }

    #[instrument(skip(self, actor, request))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: ActualizarTransaccionRequest,
    ) -> Result<Transaccion, ServiceError> {
        request.validate()?;

        let mut conn = self.diesel_pool.get().await?;
        reject_payment_generated(&Self::find(&mut conn, id).await?)?;

        let changes = TransaccionUpdate {
            tipo: request.tipo,
            categoria: trim_optional_field(request.categoria.as_ref()),
            descripcion: request
                .descripcion
                .as_ref()
                .map(|d| trim_optional_field(Some(d))),
            monto: request.monto,
            fecha: request.fecha,
            updated_at: Some(Utc::now()),
        };

        // pago_id is re-checked so a concurrent link cannot slip through
        let transaccion = diesel::update(
            transacciones::table
                .filter(transacciones::id.eq(id))
                .filter(transacciones::pago_id.is_null()),
        )
        .set(&changes)
        .returning(Transaccion::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ServiceError::not_found("Transacción"))?;

        AuditLogger::resource(AuditAction::Updated, actor.id, "transaccion", id);
        Ok(transaccion)
    }

    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        reject_payment_generated(&Self::find(&mut conn, id).await?)?;

        let deleted = diesel::delete(
            transacciones::table
                .filter(transacciones::id.eq(id))
                .filter(transacciones::pago_id.is_null()),
        )
        .execute(&mut conn)
        .await?;

        if deleted == 0 {
            return Err(ServiceError::not_found("Transacción"));
        }

        AuditLogger::resource(AuditAction::Deleted, actor.id, "transaccion", id);
        Ok(())
    }

    async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Transaccion, ServiceError> {
        transacciones::table
            .find(id)
            .select(Transaccion::as_select())
            .first::<Transaccion>(conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Transacción"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn transaccion(pago_id: Option<Uuid>) -> Transaccion {
        let now = Utc::now();
        Transaccion {
            id: Uuid::new_v4(),
            tipo: crate::models::transaction::TipoTransaccion::Ingreso,
            categoria: "pago".to_string(),
            descripcion: None,
            monto: 1000,
            fecha: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            pago_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_payment_rows_are_locked() {
        let generated = transaccion(Some(Uuid::new_v4()));
        assert!(matches!(
            reject_payment_generated(&generated),
            Err(ServiceError::Conflict(_))
        ));
        assert!(reject_payment_generated(&transaccion(None)).is_ok());
    }
}
