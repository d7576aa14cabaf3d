// Dashboard indicators handler

use axum::{extract::State, response::IntoResponse, Json};

use crate::{app::AppState, services::IndicatorService};

/// GET /api/indicadores
#[utoipa::path(
    get,
    path = "/api/indicadores",
    tag = "Indicadores",
    operation_id = "indicadores",
    responses(
        (status = 200, description = "Dashboard indicators", body = Indicadores),
        (status = 403, description = "Role not allowed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn indicadores(State(state): State<AppState>) -> impl IntoResponse {
    match IndicatorService::new(&state).dashboard().await {
        Ok(indicadores) => Json(indicadores).into_response(),
        Err(e) => e.into_response(),
    }
}
