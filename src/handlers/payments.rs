// Payment handlers

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
    models::payment::{ActualizarPagoRequest, CrearPagoRequest, PagoFilter},
    services::PaymentService,
};

/// List payments with the total and per-method totals of the filtered set
/// GET /api/pagos
#[utoipa::path(
    get,
    path = "/api/pagos",
    tag = "Pagos",
    operation_id = "listPagos",
    params(PagoFilter),
    responses(
        (status = 200, description = "Payments page with totals", body = PagoListResponse),
        (status = 400, description = "desde after hasta"),
        (status = 403, description = "Role not allowed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_pagos(
    State(state): State<AppState>,
    Query(filter): Query<PagoFilter>,
) -> impl IntoResponse {
    match PaymentService::new(&state).list(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/pagos/{id}",
    tag = "Pagos",
    operation_id = "getPago",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment", body = Pago),
        (status = 404, description = "Payment not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_pago(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match PaymentService::new(&state).get(id).await {
        Ok(pago) => Json(pago).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a payment; consumes product stock and writes one income entry
/// POST /api/pagos
#[utoipa::path(
    post,
    path = "/api/pagos",
    tag = "Pagos",
    operation_id = "createPago",
    request_body = CrearPagoRequest,
    responses(
        (status = 201, description = "Payment recorded", body = Pago),
        (status = 400, description = "Insufficient stock, inactive product or missing amount"),
        (status = 404, description = "Client or product not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_pago(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearPagoRequest>,
) -> impl IntoResponse {
    match PaymentService::new(&state).create(&auth_user, request).await {
        Ok(pago) => (StatusCode::CREATED, Json(pago)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/pagos/{id}",
    tag = "Pagos",
    operation_id = "updatePago",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = ActualizarPagoRequest,
    responses(
        (status = 200, description = "Payment updated", body = Pago),
        (status = 400, description = "Insufficient stock"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_pago(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActualizarPagoRequest>,
) -> impl IntoResponse {
    match PaymentService::new(&state).update(&auth_user, id, request).await {
        Ok(pago) => Json(pago).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/pagos/{id}",
    tag = "Pagos",
    operation_id = "deletePago",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 204, description = "Payment deleted, stock restored"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_pago(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match PaymentService::new(&state).delete(&auth_user, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
