// Routine templates, assignments and the client's own routines

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::routine::{
        ActualizarAsignacionRequest, ActualizarRutinaRequest, AsignacionFilter,
        AsignarRutinaRequest, CrearRutinaRequest, RutinaFilter,
    },
    services::RoutineService,
};

// =============================================================================
// TEMPLATES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/rutinas",
    tag = "Rutinas",
    operation_id = "listRutinas",
    params(RutinaFilter),
    responses(
        (status = 200, description = "Routines page", body = RutinaListResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_rutinas(
    State(state): State<AppState>,
    Query(filter): Query<RutinaFilter>,
) -> impl IntoResponse {
    match RoutineService::new(&state).list(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/rutinas/{id}",
    tag = "Rutinas",
    operation_id = "getRutina",
    params(("id" = Uuid, Path, description = "Routine ID")),
    responses(
        (status = 200, description = "Routine", body = RutinaResponse),
        (status = 404, description = "Routine not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_rutina(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match RoutineService::new(&state).get(id).await {
        Ok(rutina) => Json(rutina).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/rutinas",
    tag = "Rutinas",
    operation_id = "createRutina",
    request_body = CrearRutinaRequest,
    responses(
        (status = 201, description = "Routine created", body = RutinaResponse),
        (status = 400, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_rutina(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearRutinaRequest>,
) -> impl IntoResponse {
    match RoutineService::new(&state).create(&auth_user, request).await {
        Ok(rutina) => (StatusCode::CREATED, Json(rutina)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/rutinas/{id}",
    tag = "Rutinas",
    operation_id = "updateRutina",
    params(("id" = Uuid, Path, description = "Routine ID")),
    request_body = ActualizarRutinaRequest,
    responses(
        (status = 200, description = "Routine updated", body = RutinaResponse),
        (status = 404, description = "Routine not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_rutina(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActualizarRutinaRequest>,
) -> impl IntoResponse {
    match RoutineService::new(&state).update(&auth_user, id, request).await {
        Ok(rutina) => Json(rutina).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/rutinas/{id}",
    tag = "Rutinas",
    operation_id = "deleteRutina",
    params(("id" = Uuid, Path, description = "Routine ID")),
    responses(
        (status = 204, description = "Routine and its assignments deleted"),
        (status = 404, description = "Routine not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_rutina(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match RoutineService::new(&state).delete(&auth_user, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

// =============================================================================
// ASSIGNMENTS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/rutinas/asignaciones",
    tag = "Rutinas",
    operation_id = "listAsignaciones",
    params(AsignacionFilter),
    responses(
        (status = 200, description = "Assignments page", body = AsignacionListResponse),
        (status = 403, description = "Staff only")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_asignaciones(
    State(state): State<AppState>,
    Query(filter): Query<AsignacionFilter>,
) -> impl IntoResponse {
    match RoutineService::new(&state).list_assignments(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/rutinas/asignaciones/{id}",
    tag = "Rutinas",
    operation_id = "getAsignacion",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment", body = RutinaAsignada),
        (status = 404, description = "Assignment not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_asignacion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match RoutineService::new(&state).get_assignment(id).await {
        Ok(asignacion) => Json(asignacion).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/rutinas/asignaciones",
    tag = "Rutinas",
    operation_id = "asignarRutina",
    request_body = AsignarRutinaRequest,
    responses(
        (status = 201, description = "Routine assigned", body = RutinaAsignada),
        (status = 400, description = "Invalid days or period"),
        (status = 404, description = "Client or routine not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn asignar_rutina(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<AsignarRutinaRequest>,
) -> impl IntoResponse {
    match RoutineService::new(&state).assign(&auth_user, request).await {
        Ok(asignacion) => (StatusCode::CREATED, Json(asignacion)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/rutinas/asignaciones/{id}",
    tag = "Rutinas",
    operation_id = "updateAsignacion",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = ActualizarAsignacionRequest,
    responses(
        (status = 200, description = "Assignment updated", body = RutinaAsignada),
        (status = 400, description = "Invalid days or period"),
        (status = 404, description = "Assignment not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_asignacion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActualizarAsignacionRequest>,
) -> impl IntoResponse {
    match RoutineService::new(&state)
        .update_assignment(&auth_user, id, request)
        .await
    {
        Ok(asignacion) => Json(asignacion).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/rutinas/asignaciones/{id}",
    tag = "Rutinas",
    operation_id = "deleteAsignacion",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_asignacion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match RoutineService::new(&state)
        .delete_assignment(&auth_user, id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Active assignments of the calling client
/// GET /api/rutinas/mis-rutinas
#[utoipa::path(
    get,
    path = "/api/rutinas/mis-rutinas",
    tag = "Rutinas",
    operation_id = "misRutinas",
    responses(
        (status = 200, description = "Own routines", body = [MiRutina]),
        (status = 403, description = "Clients only")
    ),
    security(("bearerAuth" = []))
)]
pub async fn mis_rutinas(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    match RoutineService::new(&state).my_routines(&auth_user).await {
        Ok(rutinas) => Json(rutinas).into_response(),
        Err(e) => e.into_response(),
    }
}
