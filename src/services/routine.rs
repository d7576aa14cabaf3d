// Routine templates and their weekly assignment to clients

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
        routine::{
            dias_from_strings, dias_to_strings, validate_dias, validate_periodo,
            ActualizarAsignacionRequest, ActualizarRutinaRequest, AsignacionFilter,
            AsignacionListResponse, AsignarRutinaRequest, CrearRutinaRequest, Ejercicio,
            MiRutina, NuevaRutina, NuevaRutinaAsignada, Rutina, RutinaAsignada,
            RutinaAsignadaUpdate, RutinaFilter, RutinaListResponse, RutinaResponse, RutinaUpdate,
        },
        Pagination,
    },
    schema::{clientes, rutinas, rutinas_asignadas},
    utils::{trim_and_validate_field, trim_optional_field, AuditAction, AuditLogger, ServiceError},
};

pub struct RoutineService {
    diesel_pool: DieselPool,
}

fn decode_error(e: serde_json::Error) -> ServiceError {
    ServiceError::InternalError(format!("Stored exercise list is malformed: {}", e))
}

fn encode_ejercicios(ejercicios: &[Ejercicio]) -> Result<serde_json::Value, ServiceError> {
    for ejercicio in ejercicios {
        ejercicio.validate()?;
    }
    serde_json::to_value(ejercicios).map_err(|e| ServiceError::InternalError(e.to_string()))
}

fn filtered_rutinas(filter: &RutinaFilter) -> rutinas::BoxedQuery<'static, Pg> {
    let mut query = rutinas::table.into_boxed();

    if let Some(nivel) = filter.nivel {
        query = query.filter(rutinas::nivel.eq(nivel));
    }
    if let Some(ref buscar) = filter.buscar {
        let pattern = format!("%{}%", buscar.trim());
        query = query.filter(
            rutinas::nombre
                .ilike(pattern.clone())
                .or(rutinas::objetivo.ilike(pattern)),
        );
    }
    query
}

fn filtered_asignaciones(filter: &AsignacionFilter) -> rutinas_asignadas::BoxedQuery<'static, Pg> {
    let mut query = rutinas_asignadas::table.into_boxed();

    if let Some(cliente_id) = filter.cliente_id {
        query = query.filter(rutinas_asignadas::cliente_id.eq(cliente_id));
    }
    if let Some(rutina_id) = filter.rutina_id {
        query = query.filter(rutinas_asignadas::rutina_id.eq(rutina_id));
    }
    if let Some(activa) = filter.activa {
        query = query.filter(rutinas_asignadas::activa.eq(activa));
    }
    query
}

impl RoutineService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    // Templates

    #[instrument(skip(self))]
    pub async fn list(&self, filter: RutinaFilter) -> Result<RutinaListResponse, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let total = filtered_rutinas(&filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        let rows = filtered_rutinas(&filter)
            .order(rutinas::nombre.asc())
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(Rutina::as_select())
            .load::<Rutina>(&mut conn)
            .await?;

        let data = rows
            .into_iter()
            .map(RutinaResponse::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_error)?;

        Ok(RutinaListResponse {
            data,
            paginacion: pagination.meta(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<RutinaResponse, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let rutina = Self::find_rutina(&mut conn, id).await?;
        RutinaResponse::try_from(rutina).map_err(decode_error)
    }

    #[instrument(skip(self, actor, request))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CrearRutinaRequest,
    ) -> Result<RutinaResponse, ServiceError> {
        request.validate()?;

        let nueva = NuevaRutina {
            nombre: trim_and_validate_field(&request.nombre, true)
                .map_err(ServiceError::ValidationError)?,
            descripcion: trim_optional_field(request.descripcion.as_ref()),
            nivel: request.nivel,
            objetivo: trim_optional_field(request.objetivo.as_ref()),
            ejercicios: encode_ejercicios(&request.ejercicios)?,
            creado_por: Some(actor.id),
        };

        let mut conn = self.diesel_pool.get().await?;
        let rutina = diesel::insert_into(rutinas::table)
            .values(&nueva)
            .returning(Rutina::as_returning())
            .get_result(&mut conn)
            .await?;

        AuditLogger::resource(AuditAction::Created, actor.id, "rutina", rutina.id);
        RutinaResponse::try_from(rutina).map_err(decode_error)
    }

    #[instrument(skip(self, actor, request))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: ActualizarRutinaRequest,
    ) -> Result<RutinaResponse, ServiceError> {
        request.validate()?;

        let ejercicios = match request.ejercicios {
            Some(ref ejercicios) => Some(encode_ejercicios(ejercicios)?),
            None => None,
        };

        let changes = RutinaUpdate {
            nombre: request.nombre.map(|v| v.trim().to_string()),
            descripcion: request
                .descripcion
                .as_ref()
                .map(|d| trim_optional_field(Some(d))),
            nivel: request.nivel,
            objetivo: request.objetivo.as_ref().map(|o| trim_optional_field(Some(o))),
            ejercicios,
            updated_at: Some(Utc::now()),
        };

        let mut conn = self.diesel_pool.get().await?;
        let rutina = diesel::update(rutinas::table.find(id))
            .set(&changes)
            .returning(Rutina::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Rutina"))?;

        AuditLogger::resource(AuditAction::Updated, actor.id, "rutina", id);
        RutinaResponse::try_from(rutina).map_err(decode_error)
    }

    /// Assignments of the routine are removed with it
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let deleted = diesel::delete(rutinas::table.find(id))
            .execute(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(ServiceError::not_found("Rutina"));
        }

        AuditLogger::resource(AuditAction::Deleted, actor.id, "rutina", id);
        Ok(())
    }

    // Assignments

    #[instrument(skip(self))]
    pub async fn list_assignments(
        &self,
        filter: AsignacionFilter,
    ) -> Result<AsignacionListResponse, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let total = filtered_asignaciones(&filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        let data = filtered_asignaciones(&filter)
            .order(rutinas_asignadas::fecha_inicio.desc())
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(RutinaAsignada::as_select())
            .load::<RutinaAsignada>(&mut conn)
            .await?;

        Ok(AsignacionListResponse {
            data,
            paginacion: pagination.meta(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_assignment(&self, id: Uuid) -> Result<RutinaAsignada, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        Self::find_asignacion(&mut conn, id).await
    }

    #[instrument(skip(self, actor, request), fields(cliente_id = %request.cliente_id, rutina_id = %request.rutina_id))]
    pub async fn assign(
        &self,
        actor: &AuthenticatedUser,
        request: AsignarRutinaRequest,
    ) -> Result<RutinaAsignada, ServiceError> {
        request.validate()?;
        validate_dias(&request.dias_entrenamiento, &request.dias_descanso)
            .map_err(ServiceError::ValidationError)?;

        let fecha_inicio = request
            .fecha_inicio
            .unwrap_or_else(|| Utc::now().date_naive());
        validate_periodo(fecha_inicio, request.fecha_fin).map_err(ServiceError::ValidationError)?;

        let mut conn = self.diesel_pool.get().await?;

        clientes::table
            .find(request.cliente_id)
            .select(clientes::id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Cliente"))?;
        Self::find_rutina(&mut conn, request.rutina_id).await?;

        let nueva = NuevaRutinaAsignada {
            cliente_id: request.cliente_id,
            rutina_id: request.rutina_id,
            dias_entrenamiento: dias_to_strings(&request.dias_entrenamiento),
            dias_descanso: dias_to_strings(&request.dias_descanso),
            fecha_inicio,
            fecha_fin: request.fecha_fin,
            activa: request.activa.unwrap_or(true),
            notas: trim_optional_field(request.notas.as_ref()),
        };

        let asignacion = diesel::insert_into(rutinas_asignadas::table)
            .values(&nueva)
            .returning(RutinaAsignada::as_returning())
            .get_result(&mut conn)
            .await?;

        AuditLogger::resource(AuditAction::Created, actor.id, "rutina_asignada", asignacion.id);
        Ok(asignacion)
    }

    /// Day lists and period are validated against the merged result
    #[instrument(skip(self, actor, request))]
    pub async fn update_assignment(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: ActualizarAsignacionRequest,
    ) -> Result<RutinaAsignada, ServiceError> {
        request.validate()?;

        let mut conn = self.diesel_pool.get().await?;
        let actual = Self::find_asignacion(&mut conn, id).await?;

        let entrenamiento = request
            .dias_entrenamiento
            .clone()
            .unwrap_or_else(|| dias_from_strings(&actual.dias_entrenamiento));
        let descanso = request
            .dias_descanso
            .clone()
            .unwrap_or_else(|| dias_from_strings(&actual.dias_descanso));
        validate_dias(&entrenamiento, &descanso).map_err(ServiceError::ValidationError)?;

        let fecha_inicio = request.fecha_inicio.unwrap_or(actual.fecha_inicio);
        let fecha_fin = request.fecha_fin.or(actual.fecha_fin);
        validate_periodo(fecha_inicio, fecha_fin).map_err(ServiceError::ValidationError)?;

        let changes = RutinaAsignadaUpdate {
            dias_entrenamiento: request.dias_entrenamiento.as_deref().map(dias_to_strings),
            dias_descanso: request.dias_descanso.as_deref().map(dias_to_strings),
            fecha_inicio: request.fecha_inicio,
            fecha_fin: request.fecha_fin.map(Some),
            activa: request.activa,
            notas: request.notas.as_ref().map(|n| trim_optional_field(Some(n))),
            updated_at: Some(Utc::now()),
        };

        let asignacion = diesel::update(rutinas_asignadas::table.find(id))
            .set(&changes)
            .returning(RutinaAsignada::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Asignación"))?;

        AuditLogger::resource(AuditAction::Updated, actor.id, "rutina_asignada", id);
        Ok(asignacion)
    }

    #[instrument(skip(self, actor))]
    pub async fn delete_assignment(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<(), ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let deleted = diesel::delete(rutinas_asignadas::table.find(id))
            .execute(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(ServiceError::not_found("Asignación"));
        }

        AuditLogger::resource(AuditAction::Deleted, actor.id, "rutina_asignada", id);
        Ok(())
    }

    /// Active assignments of the client record linked to the calling user
    #[instrument(skip(self, actor), fields(usuario_id = %actor.id))]
    pub async fn my_routines(&self, actor: &AuthenticatedUser) -> Result<Vec<MiRutina>, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;

        let cliente_ids = clientes::table
            .filter(clientes::usuario_id.eq(actor.id))
            .select(clientes::id)
            .load::<Uuid>(&mut conn)
            .await?;
        if cliente_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = rutinas_asignadas::table
            .inner_join(rutinas::table)
            .filter(rutinas_asignadas::cliente_id.eq_any(cliente_ids))
            .filter(rutinas_asignadas::activa.eq(true))
            .order(rutinas_asignadas::fecha_inicio.desc())
            .select((RutinaAsignada::as_select(), Rutina::as_select()))
            .load::<(RutinaAsignada, Rutina)>(&mut conn)
            .await?;

        rows.into_iter()
            .map(|(asignacion, rutina)| {
                Ok(MiRutina {
                    asignacion,
                    rutina: RutinaResponse::try_from(rutina).map_err(decode_error)?,
                })
            })
            .collect()
    }

    async fn find_rutina(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Rutina, ServiceError> {
        rutinas::table
            .find(id)
            .select(Rutina::as_select())
            .first::<Rutina>(conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Rutina"))
    }

    async fn find_asignacion(
        conn: &mut AsyncPgConnection,
        id: Uuid,
    ) -> Result<RutinaAsignada, ServiceError> {
        rutinas_asignadas::table
            .find(id)
            .select(RutinaAsignada::as_select())
            .first::<RutinaAsignada>(conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Asignación"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ejercicios_validates_each_item() {
        let ejercicios = vec![Ejercicio {
            nombre: "Press banca".to_string(),
            series: 4,
            repeticiones: 0,
            descanso_segundos: None,
            notas: None,
        }];
        assert!(matches!(
            encode_ejercicios(&ejercicios),
            Err(ServiceError::InvalidFields(_))
        ));
    }

    #[test]
    fn test_encode_ejercicios_omits_empty_optionals() {
        let ejercicios = vec![Ejercicio {
            nombre: "Remo".to_string(),
            series: 3,
            repeticiones: 12,
            descanso_segundos: Some(60),
            notas: None,
        }];
        let value = encode_ejercicios(&ejercicios).unwrap();
        assert_eq!(value[0]["descanso_segundos"], 60);
        assert!(value[0].get("notas").is_none());
    }
}
