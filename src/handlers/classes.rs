// Class catalogue, availability and registrations

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
    models::class_registration::{
        CatalogoFilter, DisponibilidadQuery, InscribirRequest, InscripcionFilter,
    },
    services::ClassService,
};

/// Every active trainer's classes with per-slot occupancy
/// GET /api/clases
#[utoipa::path(
    get,
    path = "/api/clases",
    tag = "Clases",
    operation_id = "catalogoClases",
    params(CatalogoFilter),
    responses(
        (status = 200, description = "Class catalogue", body = [ClaseCatalogo]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn catalogo(
    State(state): State<AppState>,
    Query(filter): Query<CatalogoFilter>,
) -> impl IntoResponse {
    match ClassService::new(&state).catalogue(filter).await {
        Ok(catalogo) => Json(catalogo).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Seats for one slot
/// GET /api/clases/disponibilidad
#[utoipa::path(
    get,
    path = "/api/clases/disponibilidad",
    tag = "Clases",
    operation_id = "disponibilidadClase",
    params(DisponibilidadQuery),
    responses(
        (status = 200, description = "Slot availability", body = Disponibilidad),
        (status = 400, description = "Unknown class or slot"),
        (status = 404, description = "Trainer not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn disponibilidad(
    State(state): State<AppState>,
    Query(query): Query<DisponibilidadQuery>,
) -> impl IntoResponse {
    match ClassService::new(&state).availability(query).await {
        Ok(disponibilidad) => Json(disponibilidad).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/clases/inscripciones",
    tag = "Clases",
    operation_id = "listInscripciones",
    params(InscripcionFilter),
    responses(
        (status = 200, description = "Registrations page", body = InscripcionListResponse),
        (status = 403, description = "Staff only")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_inscripciones(
    State(state): State<AppState>,
    Query(filter): Query<InscripcionFilter>,
) -> impl IntoResponse {
    match ClassService::new(&state).list(filter).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/clases/inscripciones/{id}",
    tag = "Clases",
    operation_id = "getInscripcion",
    params(("id" = Uuid, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Registration", body = InscripcionClase),
        (status = 404, description = "Registration not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_inscripcion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match ClassService::new(&state).get(id).await {
        Ok(inscripcion) => Json(inscripcion).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a client into a class slot
/// POST /api/clases/inscripciones
#[utoipa::path(
    post,
    path = "/api/clases/inscripciones",
    tag = "Clases",
    operation_id = "inscribir",
    request_body = InscribirRequest,
    responses(
        (status = 201, description = "Client registered", body = InscripcionClase),
        (status = 400, description = "Class full, unknown slot or inactive client"),
        (status = 404, description = "Trainer or client not found"),
        (status = 409, description = "Client already registered in the slot")
    ),
    security(("bearerAuth" = []))
)]
pub async fn inscribir(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<InscribirRequest>,
) -> impl IntoResponse {
    match ClassService::new(&state).register(&auth_user, request).await {
        Ok(inscripcion) => (StatusCode::CREATED, Json(inscripcion)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/clases/inscripciones/{id}",
    tag = "Clases",
    operation_id = "cancelarInscripcion",
    params(("id" = Uuid, Path, description = "Registration ID")),
    responses(
        (status = 204, description = "Registration cancelled"),
        (status = 404, description = "Registration not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn cancelar_inscripcion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match ClassService::new(&state).cancel(&auth_user, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
