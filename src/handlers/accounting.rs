// Accounting (ledger) handlers

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
    models::transaction::{ActualizarTransaccionRequest, CrearTransaccionRequest, TransaccionFilter},
    services::AccountingService,
};

/// Ledger rows with income, expense and balance over the filtered set
/// GET /api/contabilidad
#[utoipa::path(
    get,
    path = "/api/contabilidad",
    tag = "Contabilidad",
    operation_id = "listTransacciones",
    params(TransaccionFilter),
    responses(
        (status = 200, description = "Ledger page with totals", body = TransaccionListResponse),
        (status = 400, description = "desde after hasta"),
        (status = 403, description = "Admin only")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_transacciones(
    State(state): State<AppState>,
    Query(filter): Query<TransaccionFilter>,
) -> impl IntoResponse {
    match AccountingService::new(&state).list(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Totals only
/// GET /api/contabilidad/resumen
#[utoipa::path(
    get,
    path = "/api/contabilidad/resumen",
    tag = "Contabilidad",
    operation_id = "resumenContable",
    params(TransaccionFilter),
    responses(
        (status = 200, description = "Totals", body = ResumenContable),
        (status = 400, description = "desde after hasta")
    ),
    security(("bearerAuth" = []))
)]
pub async fn resumen(
    State(state): State<AppState>,
    Query(filter): Query<TransaccionFilter>,
) -> impl IntoResponse {
    match AccountingService::new(&state).summary(filter).await {
        Ok(resumen) => Json(resumen).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/contabilidad/{id}",
    tag = "Contabilidad",
    operation_id = "getTransaccion",
    params(("id" = Uuid, Path, description = "Ledger entry ID")),
    responses(
        (status = 200, description = "Ledger entry", body = Transaccion),
        (status = 404, description = "Entry not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_transaccion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match AccountingService::new(&state).get(id).await {
        Ok(transaccion) => Json(transaccion).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/contabilidad",
    tag = "Contabilidad",
    operation_id = "createTransaccion",
    request_body = CrearTransaccionRequest,
    responses(
        (status = 201, description = "Entry created", body = Transaccion),
        (status = 400, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_transaccion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearTransaccionRequest>,
) -> impl IntoResponse {
    match AccountingService::new(&state).create(&auth_user, request).await {
        Ok(transaccion) => (StatusCode::CREATED, Json(transaccion)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/contabilidad/{id}",
    tag = "Contabilidad",
    operation_id = "updateTransaccion",
    params(("id" = Uuid, Path, description = "Ledger entry ID")),
    request_body = ActualizarTransaccionRequest,
    responses(
        (status = 200, description = "Entry updated", body = Transaccion),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Entry belongs to a payment")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_transaccion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ActualizarTransaccionRequest>,
) -> impl IntoResponse {
    match AccountingService::new(&state).update(&auth_user, id, request).await {
        Ok(transaccion) => Json(transaccion).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/contabilidad/{id}",
    tag = "Contabilidad",
    operation_id = "deleteTransaccion",
    params(("id" = Uuid, Path, description = "Ledger entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Entry belongs to a payment")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_transaccion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match AccountingService::new(&state).delete(&auth_user, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
