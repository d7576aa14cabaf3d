// Class registrations against trainer class slots
// Registration runs in one transaction holding the trainer row lock, so
// concurrent sign-ups for the same trainer cannot overbook a slot.

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::collections::HashMap;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    middleware::AuthenticatedUser,
    models::{
        class_registration::{
            seats_available, CatalogoFilter, ClaseCatalogo, Disponibilidad, DisponibilidadQuery,
            HorarioOcupacion, InscribirRequest, InscripcionClase, InscripcionFilter,
            InscripcionListResponse, NuevaInscripcion,
        },
        client::Cliente,
        trainer::{ClaseEntrenador, DiaSemana, Entrenador},
        Pagination,
    },
    schema::{clientes, entrenadores, inscripciones_clase},
    services::trainer::decode_error,
    utils::{AuditAction, AuditLogger, ServiceError},
};

pub struct ClassService {
    diesel_pool: DieselPool,
    default_capacity: i32,
}

/// (trainer, class, day, start, end)
type SlotKey = (Uuid, String, String, String, String);

fn filtered(filter: &InscripcionFilter) -> inscripciones_clase::BoxedQuery<'static, Pg> {
    let mut query = inscripciones_clase::table.into_boxed();

    if let Some(entrenador_id) = filter.entrenador_id {
        query = query.filter(inscripciones_clase::entrenador_id.eq(entrenador_id));
    }
    if let Some(cliente_id) = filter.cliente_id {
        query = query.filter(inscripciones_clase::cliente_id.eq(cliente_id));
    }
    if let Some(ref nombre) = filter.nombre_clase {
        // ILIKE without wildcards is a case-insensitive equality
        query = query.filter(inscripciones_clase::nombre_clase.ilike(nombre.trim().to_string()));
    }
    if let Some(dia) = filter.dia {
        query = query.filter(inscripciones_clase::dia.eq(dia.as_str()));
    }
    query
}

/// Resolve the class and make sure the requested slot is one of its declared slots
fn resolve_slot(
    entrenador: &Entrenador,
    nombre_clase: &str,
    dia: DiaSemana,
    hora_inicio: &str,
    hora_fin: &str,
) -> Result<ClaseEntrenador, ServiceError> {
    let clase = entrenador
        .find_clase(nombre_clase)
        .map_err(decode_error)?
        .ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "El entrenador no imparte la clase '{}'",
                nombre_clase.trim()
            ))
        })?;

    if !clase.has_slot(dia, hora_inicio, hora_fin) {
        return Err(ServiceError::ValidationError(format!(
            "La clase '{}' no tiene horario el {} de {} a {}",
            clase.nombre, dia, hora_inicio, hora_fin
        )));
    }
    Ok(clase)
}

async fn count_slot(
    conn: &mut AsyncPgConnection,
    entrenador_id: Uuid,
    nombre_clase: &str,
    dia: DiaSemana,
    hora_inicio: &str,
    hora_fin: &str,
) -> Result<i64, diesel::result::Error> {
    inscripciones_clase::table
        .filter(inscripciones_clase::entrenador_id.eq(entrenador_id))
        .filter(inscripciones_clase::nombre_clase.eq(nombre_clase))
        .filter(inscripciones_clase::dia.eq(dia.as_str()))
        .filter(inscripciones_clase::hora_inicio.eq(hora_inicio))
        .filter(inscripciones_clase::hora_fin.eq(hora_fin))
        .count()
        .get_result::<i64>(conn)
        .await
}

impl ClassService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
            default_capacity: state.config.gym.class_default_capacity,
        }
    }

    /// Register a client into a trainer class slot
    #[instrument(skip(self, actor, request), fields(entrenador_id = %request.entrenador_id, cliente_id = %request.cliente_id))]
    pub async fn register(
        &self,
        actor: &AuthenticatedUser,
        request: InscribirRequest,
    ) -> Result<InscripcionClase, ServiceError> {
        request.validate()?;

        let default_capacity = self.default_capacity;
        let mut conn = self.diesel_pool.get().await?;

        let inscripcion = conn
            .transaction::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    let entrenador = entrenadores::table
                        .find(request.entrenador_id)
                        .for_update()
                        .select(Entrenador::as_select())
                        .first::<Entrenador>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| ServiceError::not_found("Entrenador"))?;

                    if !entrenador.activo {
                        return Err(ServiceError::ValidationError(
                            "El entrenador no está activo".to_string(),
                        ));
                    }

                    let clase = resolve_slot(
                        &entrenador,
                        &request.nombre_clase,
                        request.dia,
                        &request.hora_inicio,
                        &request.hora_fin,
                    )?;

                    let cliente = clientes::table
                        .find(request.cliente_id)
                        .select(Cliente::as_select())
                        .first::<Cliente>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| ServiceError::not_found("Cliente"))?;

                    if !cliente.is_active() {
                        return Err(ServiceError::ValidationError(format!(
                            "El cliente está {} y no puede inscribirse",
                            cliente.estado.as_str()
                        )));
                    }

                    let already = inscripciones_clase::table
                        .filter(inscripciones_clase::cliente_id.eq(cliente.id))
                        .filter(inscripciones_clase::entrenador_id.eq(entrenador.id))
                        .filter(inscripciones_clase::nombre_clase.eq(&clase.nombre))
                        .filter(inscripciones_clase::dia.eq(request.dia.as_str()))
                        .filter(inscripciones_clase::hora_inicio.eq(&request.hora_inicio))
                        .filter(inscripciones_clase::hora_fin.eq(&request.hora_fin))
                        .count()
                        .get_result::<i64>(conn)
                        .await?;
                    if already > 0 {
                        return Err(ServiceError::Conflict(
                            "El cliente ya está inscrito en este horario".to_string(),
                        ));
                    }

                    let capacidad = clase.capacidad(default_capacity);
                    let ocupados = count_slot(
                        conn,
                        entrenador.id,
                        &clase.nombre,
                        request.dia,
                        &request.hora_inicio,
                        &request.hora_fin,
                    )
                    .await?;

                    if ocupados >= i64::from(capacidad) {
                        return Err(ServiceError::CapacityExceeded(format!(
                            "La clase '{}' alcanzó su capacidad máxima ({})",
                            clase.nombre, capacidad
                        )));
                    }

                    let nueva = NuevaInscripcion {
                        cliente_id: cliente.id,
                        entrenador_id: entrenador.id,
                        nombre_clase: clase.nombre,
                        dia: request.dia.as_str().to_string(),
                        hora_inicio: request.hora_inicio,
                        hora_fin: request.hora_fin,
                    };

                    let inscripcion = diesel::insert_into(inscripciones_clase::table)
                        .values(&nueva)
                        .returning(InscripcionClase::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok(inscripcion)
                })
            })
            .await?;

        info!(inscripcion_id = %inscripcion.id, "Client registered into class");
        AuditLogger::resource(AuditAction::Created, actor.id, "inscripcion_clase", inscripcion.id);
        Ok(inscripcion)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: InscripcionFilter) -> Result<InscripcionListResponse, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let total = filtered(&filter).count().get_result::<i64>(&mut conn).await?;
        let data = filtered(&filter)
            .order(inscripciones_clase::created_at.desc())
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(InscripcionClase::as_select())
            .load::<InscripcionClase>(&mut conn)
            .await?;

        Ok(InscripcionListResponse {
            data,
            paginacion: pagination.meta(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<InscripcionClase, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        inscripciones_clase::table
            .find(id)
            .select(InscripcionClase::as_select())
            .first::<InscripcionClase>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Inscripción"))
    }

    #[instrument(skip(self, actor))]
    pub async fn cancel(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let deleted = diesel::delete(inscripciones_clase::table.find(id))
            .execute(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(ServiceError::not_found("Inscripción"));
        }

        AuditLogger::resource(AuditAction::Deleted, actor.id, "inscripcion_clase", id);
        Ok(())
    }

    /// Seats taken and left in one slot
    #[instrument(skip(self))]
    pub async fn availability(&self, query: DisponibilidadQuery) -> Result<Disponibilidad, ServiceError> {
        query.validate()?;

        let mut conn = self.diesel_pool.get().await?;
        let entrenador = entrenadores::table
            .find(query.entrenador_id)
            .select(Entrenador::as_select())
            .first::<Entrenador>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Entrenador"))?;

        let clase = resolve_slot(
            &entrenador,
            &query.nombre_clase,
            query.dia,
            &query.hora_inicio,
            &query.hora_fin,
        )?;

        let capacidad = clase.capacidad(self.default_capacity);
        let ocupados = count_slot(
            &mut conn,
            entrenador.id,
            &clase.nombre,
            query.dia,
            &query.hora_inicio,
            &query.hora_fin,
        )
        .await?;

        Ok(Disponibilidad {
            entrenador_id: entrenador.id,
            nombre_clase: clase.nombre,
            dia: query.dia,
            hora_inicio: query.hora_inicio,
            hora_fin: query.hora_fin,
            capacidad,
            ocupados,
            disponibles: seats_available(capacidad, ocupados),
        })
    }

    /// Every class of every active trainer with per-slot occupancy
    #[instrument(skip(self))]
    pub async fn catalogue(&self, filter: CatalogoFilter) -> Result<Vec<ClaseCatalogo>, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;

        let mut trainers_query = entrenadores::table
            .filter(entrenadores::activo.eq(true))
            .into_boxed();
        if let Some(entrenador_id) = filter.entrenador_id {
            trainers_query = trainers_query.filter(entrenadores::id.eq(entrenador_id));
        }
        let trainers = trainers_query
            .order((entrenadores::apellido.asc(), entrenadores::nombre.asc()))
            .select(Entrenador::as_select())
            .load::<Entrenador>(&mut conn)
            .await?;

        let counts: HashMap<SlotKey, i64> = inscripciones_clase::table
            .group_by((
                inscripciones_clase::entrenador_id,
                inscripciones_clase::nombre_clase,
                inscripciones_clase::dia,
                inscripciones_clase::hora_inicio,
                inscripciones_clase::hora_fin,
            ))
            .select((
                inscripciones_clase::entrenador_id,
                inscripciones_clase::nombre_clase,
                inscripciones_clase::dia,
                inscripciones_clase::hora_inicio,
                inscripciones_clase::hora_fin,
                diesel::dsl::count_star(),
            ))
            .load::<(Uuid, String, String, String, String, i64)>(&mut conn)
            .await?
            .into_iter()
            .map(|(e, n, d, i, f, c)| ((e, n, d, i, f), c))
            .collect();

        let mut catalogo = Vec::new();
        for entrenador in &trainers {
            let nombre_entrenador = format!("{} {}", entrenador.nombre, entrenador.apellido);
            for clase in entrenador.clases().map_err(decode_error)? {
                let capacidad = clase.capacidad(self.default_capacity);
                let horarios: Vec<HorarioOcupacion> = clase
                    .horarios
                    .iter()
                    .filter(|h| filter.dia.map_or(true, |dia| h.dia == dia))
                    .map(|h| {
                        let key = (
                            entrenador.id,
                            clase.nombre.clone(),
                            h.dia.as_str().to_string(),
                            h.hora_inicio.clone(),
                            h.hora_fin.clone(),
                        );
                        let ocupados = counts.get(&key).copied().unwrap_or(0);
                        HorarioOcupacion {
                            dia: h.dia,
                            hora_inicio: h.hora_inicio.clone(),
                            hora_fin: h.hora_fin.clone(),
                            ocupados,
                            disponibles: seats_available(capacidad, ocupados),
                        }
                    })
                    .collect();

                if filter.dia.is_some() && horarios.is_empty() {
                    continue;
                }

                catalogo.push(ClaseCatalogo {
                    entrenador_id: entrenador.id,
                    entrenador: nombre_entrenador.clone(),
                    nombre: clase.nombre,
                    descripcion: clase.descripcion,
                    capacidad_maxima: capacidad,
                    horarios,
                });
            }
        }

        Ok(catalogo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn entrenador(clases: serde_json::Value) -> Entrenador {
        let now = Utc::now();
        Entrenador {
            id: Uuid::new_v4(),
            nombre: "Laura".to_string(),
            apellido: "Pérez".to_string(),
            email: None,
            telefono: None,
            especialidad: None,
            activo: true,
            clases,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_resolve_slot_matches_name_case_insensitively() {
        let e = entrenador(json!([{
            "nombre": "Spinning",
            "capacidad_maxima": 2,
            "horarios": [{"dia": "lunes", "hora_inicio": "07:00", "hora_fin": "08:00"}]
        }]));

        let clase = resolve_slot(&e, " spinning ", DiaSemana::Lunes, "07:00", "08:00").unwrap();
        assert_eq!(clase.nombre, "Spinning");
        assert_eq!(clase.capacidad(10), 2);
    }

    #[test]
    fn test_resolve_slot_rejects_unknown_slot_or_class() {
        let e = entrenador(json!([{
            "nombre": "Yoga",
            "horarios": [{"dia": "martes", "hora_inicio": "09:00", "hora_fin": "10:00"}]
        }]));

        let wrong_day = resolve_slot(&e, "Yoga", DiaSemana::Miercoles, "09:00", "10:00");
        assert!(matches!(wrong_day, Err(ServiceError::ValidationError(_))));

        let wrong_class = resolve_slot(&e, "Pilates", DiaSemana::Martes, "09:00", "10:00");
        assert!(matches!(wrong_class, Err(ServiceError::ValidationError(_))));
    }

    #[test]
    fn test_malformed_jsonb_is_internal_error() {
        let e = entrenador(json!({"not": "a list"}));
        let result = resolve_slot(&e, "Yoga", DiaSemana::Martes, "09:00", "10:00");
        assert!(matches!(result, Err(ServiceError::InternalError(_))));
    }
}
