// Trainer handlers

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
    models::trainer::{ActualizarEntrenadorRequest, CrearEntrenadorRequest, EntrenadorFilter},
    services::TrainerService,
};

/// List trainers with their classes
/// GET /api/entrenadores
#[utoipa::path(
    get,
    path = "/api/entrenadores",
    tag = "Entrenadores",
    operation_id = "listEntrenadores",
    params(EntrenadorFilter),
    responses(
        (status = 200, description = "Trainers page", body = EntrenadorListResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_entrenadores(
    State(state): State<AppState>,
    Query(filter): Query<EntrenadorFilter>,
) -> impl IntoResponse {
    match TrainerService::new(&state).list(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/entrenadores/{id}",
    tag = "Entrenadores",
    operation_id = "getEntrenador",
    params(("id" = Uuid, Path, description = "Trainer ID")),
    responses(
        (status = 200, description = "Trainer", body = EntrenadorResponse),
        (status = 404, description = "Trainer not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_entrenador(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match TrainerService::new(&state).get(id).await {
        Ok(entrenador) => Json(entrenador).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/entrenadores",
    tag = "Entrenadores",
    operation_id = "createEntrenador",
    request_body = CrearEntrenadorRequest,
    responses(
        (status = 201, description = "Trainer created", body = EntrenadorResponse),
        (status = 400, description = "Invalid classes or slots")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_entrenador(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearEntrenadorRequest>,
) -> impl IntoResponse {
    match TrainerService::new(&state).create(&auth_user, request).await {
        Ok(entrenador) => (StatusCode::CREATED, Json(entrenador)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/entrenadores/{id}",
    tag = "Entrenadores",
    operation_id = "updateEntrenador",
    params(("id" = Uuid, Path, description = "Trainer ID")),
    request_body = ActualizarEntrenadorRequest,
    responses(
        (status = 200, description = "Trainer updated", body = EntrenadorResponse),
        (status = 400, description = "Invalid classes or slots"),
        (status = 404, description = "Trainer not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_entrenador(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActualizarEntrenadorRequest>,
) -> impl IntoResponse {
    match TrainerService::new(&state).update(&auth_user, id, request).await {
        Ok(entrenador) => Json(entrenador).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/entrenadores/{id}",
    tag = "Entrenadores",
    operation_id = "deleteEntrenador",
    params(("id" = Uuid, Path, description = "Trainer ID")),
    responses(
        (status = 204, description = "Trainer and its registrations deleted"),
        (status = 404, description = "Trainer not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_entrenador(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match TrainerService::new(&state).delete(&auth_user, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
