// Attendance session handlers

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
    models::session::{
        ActualizarSesionRequest, CrearSesionRequest, RegistrarSalidaRequest, SesionFilter,
    },
    services::SessionService,
};

#[utoipa::path(
    get,
    path = "/api/sesiones",
    tag = "Sesiones",
    operation_id = "listSesiones",
    params(SesionFilter),
    responses(
        (status = 200, description = "Sessions page", body = SesionListResponse),
        (status = 403, description = "Role not allowed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_sesiones(
    State(state): State<AppState>,
    Query(filter): Query<SesionFilter>,
) -> impl IntoResponse {
    match SessionService::new(&state).list(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/sesiones/{id}",
    tag = "Sesiones",
    operation_id = "getSesion",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session", body = Sesion),
        (status = 404, description = "Session not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_sesion(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match SessionService::new(&state).get(id).await {
        Ok(sesion) => Json(sesion).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Check-in
/// POST /api/sesiones
#[utoipa::path(
    post,
    path = "/api/sesiones",
    tag = "Sesiones",
    operation_id = "createSesion",
    request_body = CrearSesionRequest,
    responses(
        (status = 201, description = "Session opened", body = Sesion),
        (status = 400, description = "Check-out before check-in"),
        (status = 404, description = "Client or trainer not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_sesion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearSesionRequest>,
) -> impl IntoResponse {
    match SessionService::new(&state).create(&auth_user, request).await {
        Ok(sesion) => (StatusCode::CREATED, Json(sesion)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/sesiones/{id}",
    tag = "Sesiones",
    operation_id = "updateSesion",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = ActualizarSesionRequest,
    responses(
        (status = 200, description = "Session updated", body = Sesion),
        (status = 404, description = "Session not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_sesion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActualizarSesionRequest>,
) -> impl IntoResponse {
    match SessionService::new(&state).update(&auth_user, id, request).await {
        Ok(sesion) => Json(sesion).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Check-out
/// POST /api/sesiones/{id}/salida
#[utoipa::path(
    post,
    path = "/api/sesiones/{id}/salida",
    tag = "Sesiones",
    operation_id = "registrarSalida",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = RegistrarSalidaRequest,
    responses(
        (status = 200, description = "Session closed", body = Sesion),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Session already closed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn registrar_salida(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    request: Option<Json<RegistrarSalidaRequest>>,
) -> impl IntoResponse {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    match SessionService::new(&state)
        .check_out(&auth_user, id, request)
        .await
    {
        Ok(sesion) => Json(sesion).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/sesiones/{id}",
    tag = "Sesiones",
    operation_id = "deleteSesion",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_sesion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match SessionService::new(&state).delete(&auth_user, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
