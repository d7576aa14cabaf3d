// Product handlers

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
    models::product::{ActualizarProductoRequest, CrearProductoRequest, ProductoFilter},
    services::ProductService,
};

#[utoipa::path(
    get,
    path = "/api/productos",
    tag = "Productos",
    operation_id = "listProductos",
    params(ProductoFilter),
    responses(
        (status = 200, description = "Products page", body = ProductoListResponse),
        (status = 403, description = "Role not allowed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_productos(
    State(state): State<AppState>,
    Query(filter): Query<ProductoFilter>,
) -> impl IntoResponse {
    match ProductService::new(&state).list(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/productos/{id}",
    tag = "Productos",
    operation_id = "getProducto",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = Producto),
        (status = 404, description = "Product not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_producto(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match ProductService::new(&state).get(id).await {
        Ok(producto) => Json(producto).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/productos",
    tag = "Productos",
    operation_id = "createProducto",
    request_body = CrearProductoRequest,
    responses(
        (status = 201, description = "Product created", body = Producto),
        (status = 400, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_producto(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearProductoRequest>,
) -> impl IntoResponse {
    match ProductService::new(&state).create(&auth_user, request).await {
        Ok(producto) => (StatusCode::CREATED, Json(producto)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/productos/{id}",
    tag = "Productos",
    operation_id = "updateProducto",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ActualizarProductoRequest,
    responses(
        (status = 200, description = "Product updated", body = Producto),
        (status = 404, description = "Product not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_producto(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActualizarProductoRequest>,
) -> impl IntoResponse {
    match ProductService::new(&state).update(&auth_user, id, request).await {
        Ok(producto) => Json(producto).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/productos/{id}",
    tag = "Productos",
    operation_id = "deleteProducto",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_producto(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match ProductService::new(&state).delete(&auth_user, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
