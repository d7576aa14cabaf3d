// Client handlers

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
    models::client::{ActualizarClienteRequest, ClienteFilter, CrearClienteRequest},
    services::ClientService,
};

/// List clients, searchable by name, identification or email
/// GET /api/clientes
#[utoipa::path(
    get,
    path = "/api/clientes",
    tag = "Clientes",
    operation_id = "listClientes",
    params(ClienteFilter),
    responses(
        (status = 200, description = "Clients page", body = ClienteListResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role not allowed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_clientes(
    State(state): State<AppState>,
    Query(filter): Query<ClienteFilter>,
) -> impl IntoResponse {
    match ClientService::new(&state).list(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    operation_id = "getCliente",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client", body = Cliente),
        (status = 404, description = "Client not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_cliente(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match ClientService::new(&state).get(id).await {
        Ok(cliente) => Json(cliente).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/clientes",
    tag = "Clientes",
    operation_id = "createCliente",
    request_body = CrearClienteRequest,
    responses(
        (status = 201, description = "Client created", body = Cliente),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Identification already registered")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_cliente(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearClienteRequest>,
) -> impl IntoResponse {
    match ClientService::new(&state).create(&auth_user, request).await {
        Ok(cliente) => (StatusCode::CREATED, Json(cliente)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    operation_id = "updateCliente",
    params(("id" = Uuid, Path, description = "Client ID")),
    request_body = ActualizarClienteRequest,
    responses(
        (status = 200, description = "Client updated", body = Cliente),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Identification already registered")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_cliente(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActualizarClienteRequest>,
) -> impl IntoResponse {
    match ClientService::new(&state).update(&auth_user, id, request).await {
        Ok(cliente) => Json(cliente).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    operation_id = "deleteCliente",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Client has payments")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_cliente(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match ClientService::new(&state).delete(&auth_user, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
