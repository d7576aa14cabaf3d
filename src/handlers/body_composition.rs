// Body composition handlers

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
    models::body_composition::{
        ActualizarComposicionRequest, ComposicionFilter, CrearComposicionRequest,
    },
    services::BodyCompositionService,
};

#[utoipa::path(
    get,
    path = "/api/composicion-corporal",
    tag = "Composicion corporal",
    operation_id = "listComposicion",
    params(ComposicionFilter),
    responses(
        (status = 200, description = "Measurements page", body = ComposicionListResponse),
        (status = 403, description = "Role not allowed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_composicion(
    State(state): State<AppState>,
    Query(filter): Query<ComposicionFilter>,
) -> impl IntoResponse {
    match BodyCompositionService::new(&state).list(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Client history with latest record and weight delta
/// GET /api/composicion-corporal/cliente/{identificacion}
#[utoipa::path(
    get,
    path = "/api/composicion-corporal/cliente/{identificacion}",
    tag = "Composicion corporal",
    operation_id = "historialComposicion",
    params(("identificacion" = String, Path, description = "Client identification")),
    responses(
        (status = 200, description = "History", body = HistorialComposicion),
        (status = 404, description = "Client not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn historial(
    State(state): State<AppState>,
    Path(identificacion): Path<String>,
) -> impl IntoResponse {
    match BodyCompositionService::new(&state)
        .history(&identificacion)
        .await
    {
        Ok(historial) => Json(historial).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/composicion-corporal/{id}",
    tag = "Composicion corporal",
    operation_id = "getComposicion",
    params(("id" = Uuid, Path, description = "Measurement ID")),
    responses(
        (status = 200, description = "Measurement", body = ComposicionCorporal),
        (status = 404, description = "Measurement not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_composicion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match BodyCompositionService::new(&state).get(id).await {
        Ok(registro) => Json(registro).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/composicion-corporal",
    tag = "Composicion corporal",
    operation_id = "createComposicion",
    request_body = CrearComposicionRequest,
    responses(
        (status = 201, description = "Measurement recorded", body = ComposicionCorporal),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Client not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_composicion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearComposicionRequest>,
) -> impl IntoResponse {
    match BodyCompositionService::new(&state)
        .create(&auth_user, request)
        .await
    {
        Ok(registro) => (StatusCode::CREATED, Json(registro)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/composicion-corporal/{id}",
    tag = "Composicion corporal",
    operation_id = "updateComposicion",
    params(("id" = Uuid, Path, description = "Measurement ID")),
    request_body = ActualizarComposicionRequest,
    responses(
        (status = 200, description = "Measurement updated", body = ComposicionCorporal),
        (status = 404, description = "Measurement not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_composicion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActualizarComposicionRequest>,
) -> impl IntoResponse {
    match BodyCompositionService::new(&state)
        .update(&auth_user, id, request)
        .await
    {
        Ok(registro) => Json(registro).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/composicion-corporal/{id}",
    tag = "Composicion corporal",
    operation_id = "deleteComposicion",
    params(("id" = Uuid, Path, description = "Measurement ID")),
    responses(
        (status = 204, description = "Measurement deleted"),
        (status = 404, description = "Measurement not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_composicion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match BodyCompositionService::new(&state)
        .delete(&auth_user, id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
