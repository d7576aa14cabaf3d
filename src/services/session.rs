// Attendance sessions: check-in, check-out and history

use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    middleware::AuthenticatedUser,
    models::{
        session::{
            validate_salida, ActualizarSesionRequest, CrearSesionRequest, NuevaSesion,
            RegistrarSalidaRequest, Sesion, SesionFilter, SesionListResponse, SesionUpdate,
        },
        Pagination,
    },
    schema::{clientes, entrenadores, sesiones},
    utils::{trim_optional_field, validate_date_range, AuditAction, AuditLogger, ServiceError},
};

pub struct SessionService {
    diesel_pool: DieselPool,
}

fn filtered(filter: &SesionFilter) -> sesiones::BoxedQuery<'static, Pg> {
    let mut query = sesiones::table.into_boxed();

    if let Some(cliente_id) = filter.cliente_id {
        query = query.filter(sesiones::cliente_id.eq(cliente_id));
    }
    if let Some(entrenador_id) = filter.entrenador_id {
        query = query.filter(sesiones::entrenador_id.eq(entrenador_id));
    }
    if let Some(desde) = filter.desde {
        query = query.filter(sesiones::fecha.ge(desde));
    }
    if let Some(hasta) = filter.hasta {
        query = query.filter(sesiones::fecha.le(hasta));
    }
    match filter.abiertas {
        Some(true) => query = query.filter(sesiones::hora_salida.is_null()),
        Some(false) => query = query.filter(sesiones::hora_salida.is_not_null()),
        None => {},
    }
    query
}

async fn ensure_references(
    conn: &mut AsyncPgConnection,
    cliente_id: Option<Uuid>,
    entrenador_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    if let Some(id) = cliente_id {
        clientes::table
            .find(id)
            .select(clientes::id)
            .first::<Uuid>(conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Cliente"))?;
    }
    if let Some(id) = entrenador_id {
        entrenadores::table
            .find(id)
            .select(entrenadores::id)
            .first::<Uuid>(conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Entrenador"))?;
    }
    Ok(())
}

impl SessionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: SesionFilter) -> Result<SesionListResponse, ServiceError> {
        validate_date_range(filter.desde, filter.hasta).map_err(ServiceError::ValidationError)?;

        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let total = filtered(&filter).count().get_result::<i64>(&mut conn).await?;
        let data = filtered(&filter)
            .order(sesiones::hora_entrada.desc())
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(Sesion::as_select())
            .load::<Sesion>(&mut conn)
            .await?;

        Ok(SesionListResponse {
            data,
            paginacion: pagination.meta(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Sesion, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        Self::find(&mut conn, id).await
    }

    /// Check-in. Entry time defaults to now and the date to the entry day.
    #[instrument(skip(self, actor, request), fields(cliente_id = %request.cliente_id))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CrearSesionRequest,
    ) -> Result<Sesion, ServiceError> {
        request.validate()?;

        let hora_entrada = request.hora_entrada.unwrap_or_else(Utc::now);
        validate_salida(hora_entrada, request.hora_salida).map_err(ServiceError::ValidationError)?;

        let mut conn = self.diesel_pool.get().await?;
        ensure_references(&mut conn, Some(request.cliente_id), request.entrenador_id).await?;

        let nueva = NuevaSesion {
            cliente_id: request.cliente_id,
            entrenador_id: request.entrenador_id,
            fecha: request.fecha.unwrap_or_else(|| hora_entrada.date_naive()),
            hora_entrada,
            hora_salida: request.hora_salida,
            notas: trim_optional_field(request.notas.as_ref()),
        };

        let sesion = diesel::insert_into(sesiones::table)
            .values(&nueva)
            .returning(Sesion::as_returning())
            .get_result(&mut conn)
            .await?;

        AuditLogger::resource(AuditAction::Created, actor.id, "sesion", sesion.id);
        Ok(sesion)
    }

    #[instrument(skip(self, actor, request))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: ActualizarSesionRequest,
    ) -> Result<Sesion, ServiceError> {
        request.validate()?;

        let mut conn = self.diesel_pool.get().await?;
        let actual = Self::find(&mut conn, id).await?;

        let hora_entrada = request.hora_entrada.unwrap_or(actual.hora_entrada);
        let hora_salida = request.hora_salida.or(actual.hora_salida);
        validate_salida(hora_entrada, hora_salida).map_err(ServiceError::ValidationError)?;
        ensure_references(&mut conn, None, request.entrenador_id).await?;

        let changes = SesionUpdate {
            entrenador_id: request.entrenador_id.map(Some),
            fecha: request.fecha,
            hora_entrada: request.hora_entrada,
            hora_salida: request.hora_salida.map(Some),
            notas: request.notas.as_ref().map(|n| trim_optional_field(Some(n))),
        };

        let sesion = diesel::update(sesiones::table.find(id))
            .set(&changes)
            .returning(Sesion::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Sesión"))?;

        AuditLogger::resource(AuditAction::Updated, actor.id, "sesion", id);
        Ok(sesion)
    }

    /// Check-out of an open session
    #[instrument(skip(self, actor, request))]
    pub async fn check_out(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: RegistrarSalidaRequest,
    ) -> Result<Sesion, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let actual = Self::find(&mut conn, id).await?;

        if !actual.is_open() {
            return Err(ServiceError::Conflict(
                "La sesión ya tiene registrada la salida".to_string(),
            ));
        }

        let hora_salida = request.hora_salida.unwrap_or_else(Utc::now);
        validate_salida(actual.hora_entrada, Some(hora_salida))
            .map_err(ServiceError::ValidationError)?;

        let changes = SesionUpdate {
            hora_salida: Some(Some(hora_salida)),
            notas: request.notas.as_ref().map(|n| trim_optional_field(Some(n))),
            ..Default::default()
        };

        // Only an open row is closed, a concurrent check-out updates nothing
        let sesion = diesel::update(
            sesiones::table
                .filter(sesiones::id.eq(id))
                .filter(sesiones::hora_salida.is_null()),
        )
        .set(&changes)
        .returning(Sesion::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| {
            ServiceError::Conflict("La sesión ya tiene registrada la salida".to_string())
        })?;

        info!(sesion_id = %id, minutos = ?sesion.duracion_minutos(), "Session closed");
        AuditLogger::resource(AuditAction::CheckedOut, actor.id, "sesion", id);
        Ok(sesion)
    }

    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let deleted = diesel::delete(sesiones::table.find(id))
            .execute(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(ServiceError::not_found("Sesión"));
        }

        AuditLogger::resource(AuditAction::Deleted, actor.id, "sesion", id);
        Ok(())
    }

    async fn find(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Sesion, ServiceError> {
        sesiones::table
            .find(id)
            .select(Sesion::as_select())
            .first::<Sesion>(conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Sesión"))
    }
}
