// User administration handlers (admin only)

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
    models::user::{ActualizarUsuarioRequest, CrearUsuarioRequest, UsuarioFilter, UsuarioResponse},
    services::UserService,
};

/// List users
/// GET /api/usuarios
#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Usuarios",
    operation_id = "listUsuarios",
    params(UsuarioFilter),
    responses(
        (status = 200, description = "Users page", body = UsuarioListResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin only")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_usuarios(
    State(state): State<AppState>,
    Query(filter): Query<UsuarioFilter>,
) -> impl IntoResponse {
    match UserService::new(&state).list(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    operation_id = "getUsuario",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UsuarioResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_usuario(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match UserService::new(&state).get(id).await {
        Ok(usuario) => Json(UsuarioResponse::from(usuario)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/usuarios",
    tag = "Usuarios",
    operation_id = "createUsuario",
    request_body = CrearUsuarioRequest,
    responses(
        (status = 201, description = "User created", body = UsuarioResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_usuario(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearUsuarioRequest>,
) -> impl IntoResponse {
    match UserService::new(&state).create(&auth_user, request).await {
        Ok(usuario) => (StatusCode::CREATED, Json(UsuarioResponse::from(usuario))).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    operation_id = "updateUsuario",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ActualizarUsuarioRequest,
    responses(
        (status = 200, description = "User updated", body = UsuarioResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email taken or admin editing own role/status")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_usuario(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActualizarUsuarioRequest>,
) -> impl IntoResponse {
    match UserService::new(&state).update(&auth_user, id, request).await {
        Ok(usuario) => Json(UsuarioResponse::from(usuario)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    operation_id = "deleteUsuario",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Admin deleting own account")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_usuario(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match UserService::new(&state).delete(&auth_user, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
