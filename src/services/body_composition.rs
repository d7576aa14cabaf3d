// Body composition measurements keyed by client identification

use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    middleware::AuthenticatedUser,
    models::{
        body_composition::{
            calcular_imc, ActualizarComposicionRequest, ComposicionChanges, ComposicionCorporal,
            ComposicionFilter, ComposicionListResponse, CrearComposicionRequest,
            HistorialComposicion, NuevaComposicion,
        },
        Pagination,
    },
    schema::{clientes, composicion_corporal},
    utils::{trim_optional_field, validate_date_range, AuditAction, AuditLogger, ServiceError},
};

pub struct BodyCompositionService {
    diesel_pool: DieselPool,
}

fn filtered(filter: &ComposicionFilter) -> composicion_corporal::BoxedQuery<'static, Pg> {
    let mut query = composicion_corporal::table.into_boxed();

    if let Some(ref identificacion) = filter.cliente_identificacion {
        query = query.filter(
            composicion_corporal::cliente_identificacion.eq(identificacion.trim().to_string()),
        );
    }
    if let Some(desde) = filter.desde {
        query = query.filter(composicion_corporal::fecha.ge(desde));
    }
    if let Some(hasta) = filter.hasta {
        query = query.filter(composicion_corporal::fecha.le(hasta));
    }
    query
}

async fn ensure_client(conn: &mut AsyncPgConnection, identificacion: &str) -> Result<(), ServiceError> {
    let found = clientes::table
        .filter(clientes::identificacion.eq(identificacion))
        .count()
        .get_result::<i64>(conn)
        .await?;

    if found == 0 {
        return Err(ServiceError::NotFound(format!(
            "No existe un cliente con la identificación {}",
            identificacion
        )));
    }
    Ok(())
}

impl BodyCompositionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: ComposicionFilter) -> Result<ComposicionListResponse, ServiceError> {
        validate_date_range(filter.desde, filter.hasta).map_err(ServiceError::ValidationError)?;

        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let total = filtered(&filter).count().get_result::<i64>(&mut conn).await?;
        let data = filtered(&filter)
            .order((composicion_corporal::fecha.desc(), composicion_corporal::created_at.desc()))
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(ComposicionCorporal::as_select())
            .load::<ComposicionCorporal>(&mut conn)
            .await?;

        Ok(ComposicionListResponse {
            data,
            paginacion: pagination.meta(total),
        })
    }

    /// Whole history of one client, oldest first
    #[instrument(skip(self))]
    pub async fn history(&self, identificacion: &str) -> Result<HistorialComposicion, ServiceError> {
        let identificacion = identificacion.trim();
        let mut conn = self.diesel_pool.get().await?;
        ensure_client(&mut conn, identificacion).await?;

        let registros = composicion_corporal::table
            .filter(composicion_corporal::cliente_identificacion.eq(identificacion))
            .order((composicion_corporal::fecha.asc(), composicion_corporal::created_at.asc()))
            .select(ComposicionCorporal::as_select())
            .load::<ComposicionCorporal>(&mut conn)
            .await?;

        Ok(HistorialComposicion::new(identificacion.to_string(), registros))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ComposicionCorporal, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        Self::find(&mut conn, id).await
    }

    #[instrument(skip(self, actor, request))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CrearComposicionRequest,
    ) -> Result<ComposicionCorporal, ServiceError> {
        request.validate()?;

        let identificacion = request.cliente_identificacion.trim().to_string();
        let mut conn = self.diesel_pool.get().await?;
        ensure_client(&mut conn, &identificacion).await?;

        let nueva = NuevaComposicion {
            cliente_identificacion: identificacion,
            fecha: request.fecha.unwrap_or_else(|| Utc::now().date_naive()),
            peso_kg: request.peso_kg,
            altura_cm: request.altura_cm,
            porcentaje_grasa: request.porcentaje_grasa,
            masa_muscular_kg: request.masa_muscular_kg,
            agua_corporal: request.agua_corporal,
            grasa_visceral: request.grasa_visceral,
            imc: calcular_imc(request.peso_kg, request.altura_cm),
            notas: trim_optional_field(request.notas.as_ref()),
        };

        let registro = diesel::insert_into(composicion_corporal::table)
            .values(&nueva)
            .returning(ComposicionCorporal::as_returning())
            .get_result(&mut conn)
            .await?;

        AuditLogger::resource(AuditAction::Created, actor.id, "composicion_corporal", registro.id);
        Ok(registro)
    }

    /// IMC is recomputed from the merged weight and height
    #[instrument(skip(self, actor, request))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: ActualizarComposicionRequest,
    ) -> Result<ComposicionCorporal, ServiceError> {
        request.validate()?;

        let mut conn = self.diesel_pool.get().await?;
        let actual = Self::find(&mut conn, id).await?;

        let peso_kg = request.peso_kg.unwrap_or(actual.peso_kg);
        let altura_cm = request.altura_cm.or(actual.altura_cm);

        let changes = ComposicionChanges {
            fecha: request.fecha.unwrap_or(actual.fecha),
            peso_kg,
            altura_cm,
            porcentaje_grasa: request.porcentaje_grasa.or(actual.porcentaje_grasa),
            masa_muscular_kg: request.masa_muscular_kg.or(actual.masa_muscular_kg),
            agua_corporal: request.agua_corporal.or(actual.agua_corporal),
            grasa_visceral: request.grasa_visceral.or(actual.grasa_visceral),
            imc: calcular_imc(peso_kg, altura_cm),
            notas: match request.notas {
                Some(ref notas) => trim_optional_field(Some(notas)),
                None => actual.notas,
            },
            updated_at: Utc::now(),
        };

        let registro = diesel::update(composicion_corporal::table.find(id))
            .set(&changes)
            .returning(ComposicionCorporal::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Registro de composición corporal"))?;

        AuditLogger::resource(AuditAction::Updated, actor.id, "composicion_corporal", id);
        Ok(registro)
    }

    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let deleted = diesel::delete(composicion_corporal::table.find(id))
            .execute(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(ServiceError::not_found("Registro de composición corporal"));
        }

        AuditLogger::resource(AuditAction::Deleted, actor.id, "composicion_corporal", id);
        Ok(())
    }

    async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> Result<ComposicionCorporal, ServiceError> {
        composicion_corporal::table
            .find(id)
            .select(ComposicionCorporal::as_select())
            .first::<ComposicionCorporal>(conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Registro de composición corporal"))
    }
}
