// Trainers and their embedded class schedule

use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    middleware::AuthenticatedUser,
    models::{
        class_registration::InscripcionClase,
        trainer::{
            declares_slot, normalize_clases, validate_clases, ActualizarEntrenadorRequest,
            ClaseEntrenador, CrearEntrenadorRequest, Entrenador, EntrenadorFilter,
            EntrenadorListResponse, EntrenadorResponse, EntrenadorUpdate, NuevoEntrenador,
        },
        Pagination,
    },
    schema::{entrenadores, inscripciones_clase},
    utils::{normalize_email, trim_optional_field, AuditAction, AuditLogger, ServiceError},
};

pub struct TrainerService {
    diesel_pool: DieselPool,
    default_capacity: i32,
}

fn filtered(filter: &EntrenadorFilter) -> entrenadores::BoxedQuery<'static, Pg> {
    let mut query = entrenadores::table.into_boxed();

    if let Some(activo) = filter.activo {
        query = query.filter(entrenadores::activo.eq(activo));
    }
    if let Some(ref especialidad) = filter.especialidad {
        query = query.filter(entrenadores::especialidad.ilike(format!("%{}%", especialidad.trim())));
    }
    if let Some(ref buscar) = filter.buscar {
        let pattern = format!("%{}%", buscar.trim());
        query = query.filter(
            entrenadores::nombre
                .ilike(pattern.clone())
                .or(entrenadores::apellido.ilike(pattern)),
        );
    }
    query
}

fn encode_clases(clases: &[ClaseEntrenador]) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(clases).map_err(|e| ServiceError::InternalError(e.to_string()))
}

/// Broken JSONB is a server-side fault, not a client error
pub(crate) fn decode_error(e: serde_json::Error) -> ServiceError {
    ServiceError::InternalError(format!("Stored class list is malformed: {}", e))
}

impl TrainerService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
            default_capacity: state.config.gym.class_default_capacity,
        }
    }

    /// Derive checks, structural checks, then defaults
    fn prepare_clases(&self, clases: Vec<ClaseEntrenador>) -> Result<Vec<ClaseEntrenador>, ServiceError> {
        for clase in &clases {
            clase.validate()?;
        }
        validate_clases(&clases).map_err(ServiceError::ValidationError)?;

        Ok(normalize_clases(clases, self.default_capacity))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: EntrenadorFilter) -> Result<EntrenadorListResponse, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let total = filtered(&filter).count().get_result::<i64>(&mut conn).await?;
        let rows = filtered(&filter)
            .order((entrenadores::apellido.asc(), entrenadores::nombre.asc()))
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(Entrenador::as_select())
            .load::<Entrenador>(&mut conn)
            .await?;

        let data = rows
            .into_iter()
            .map(EntrenadorResponse::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_error)?;

        Ok(EntrenadorListResponse {
            data,
            paginacion: pagination.meta(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<EntrenadorResponse, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let entrenador = entrenadores::table
            .find(id)
            .select(Entrenador::as_select())
            .first::<Entrenador>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Entrenador"))?;

        EntrenadorResponse::try_from(entrenador).map_err(decode_error)
    }

    #[instrument(skip(self, actor, request))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CrearEntrenadorRequest,
    ) -> Result<EntrenadorResponse, ServiceError> {
        request.validate()?;
        let clases = encode_clases(&self.prepare_clases(request.clases)?)?;

        let nuevo = NuevoEntrenador {
            nombre: request.nombre.trim().to_string(),
            apellido: request.apellido.trim().to_string(),
            email: trim_optional_field(request.email.as_ref()).map(|e| normalize_email(&e)),
            telefono: trim_optional_field(request.telefono.as_ref()),
            especialidad: trim_optional_field(request.especialidad.as_ref()),
            activo: request.activo.unwrap_or(true),
            clases,
        };

        let mut conn = self.diesel_pool.get().await?;
        let entrenador = diesel::insert_into(entrenadores::table)
            .values(&nuevo)
            .returning(Entrenador::as_returning())
            .get_result(&mut conn)
            .await?;

        AuditLogger::resource(AuditAction::Created, actor.id, "entrenador", entrenador.id);
        EntrenadorResponse::try_from(entrenador).map_err(decode_error)
    }

    /// Partial edit. A new class list drops the registrations of slots it no longer declares.
    #[instrument(skip(self, actor, request))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: ActualizarEntrenadorRequest,
    ) -> Result<EntrenadorResponse, ServiceError> {
        request.validate()?;

        let clases = match request.clases {
            Some(clases) => Some(self.prepare_clases(clases)?),
            None => None,
        };

        let changes = EntrenadorUpdate {
            nombre: request.nombre.map(|v| v.trim().to_string()),
            apellido: request.apellido.map(|v| v.trim().to_string()),
            email: request
                .email
                .as_ref()
                .map(|e| trim_optional_field(Some(e)).map(|e| normalize_email(&e))),
            telefono: request.telefono.as_ref().map(|t| trim_optional_field(Some(t))),
            especialidad: request
                .especialidad
                .as_ref()
                .map(|e| trim_optional_field(Some(e))),
            activo: request.activo,
            clases: clases.as_deref().map(encode_clases).transpose()?,
            updated_at: Some(Utc::now()),
        };

        let mut conn = self.diesel_pool.get().await?;
        let (entrenador, removed) = conn
            .transaction::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    // Same row lock as registration: no sign-up lands on a slot being dropped
                    entrenadores::table
                        .find(id)
                        .for_update()
                        .select(entrenadores::id)
                        .first::<Uuid>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| ServiceError::not_found("Entrenador"))?;

                    let entrenador = diesel::update(entrenadores::table.find(id))
                        .set(&changes)
                        .returning(Entrenador::as_returning())
                        .get_result(conn)
                        .await?;

                    let Some(clases) = clases else {
                        return Ok((entrenador, 0));
                    };

                    let stale: Vec<Uuid> = inscripciones_clase::table
                        .filter(inscripciones_clase::entrenador_id.eq(id))
                        .select(InscripcionClase::as_select())
                        .load::<InscripcionClase>(conn)
                        .await?
                        .into_iter()
                        .filter(|i| {
                            !declares_slot(
                                &clases,
                                &i.nombre_clase,
                                &i.dia,
                                &i.hora_inicio,
                                &i.hora_fin,
                            )
                        })
                        .map(|i| i.id)
                        .collect();

                    if stale.is_empty() {
                        return Ok((entrenador, 0));
                    }
                    let removed = diesel::delete(
                        inscripciones_clase::table.filter(inscripciones_clase::id.eq_any(stale)),
                    )
                    .execute(conn)
                    .await?;
                    Ok((entrenador, removed))
                })
            })
            .await?;

        if removed > 0 {
            info!(entrenador_id = %id, removed, "Registrations for dropped class slots removed");
        }
        AuditLogger::resource(AuditAction::Updated, actor.id, "entrenador", id);
        EntrenadorResponse::try_from(entrenador).map_err(decode_error)
    }

    /// Class registrations of the trainer are removed by the foreign key cascade
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let deleted = diesel::delete(entrenadores::table.find(id))
            .execute(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(ServiceError::not_found("Entrenador"));
        }

        AuditLogger::resource(AuditAction::Deleted, actor.id, "entrenador", id);
        Ok(())
    }
}
