// API documentation: OpenAPI document generated from handler annotations
pub mod swagger_ui;

use axum::{
    extract::OriginalUri,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::{
    accounting, auth, body_composition, classes, clients, indicators, payments, products,
    routines, sessions, trainers, users,
};
use crate::models::{
    auth::{CambiarPasswordRequest, LoginRequest, LoginResponse, RegistroRequest},
    body_composition::{
        ActualizarComposicionRequest, ComposicionCorporal, ComposicionListResponse,
        CrearComposicionRequest, HistorialComposicion,
    },
    class_registration::{
        ClaseCatalogo, Disponibilidad, HorarioOcupacion, InscribirRequest, InscripcionClase,
        InscripcionListResponse,
    },
    client::{
        ActualizarClienteRequest, Cliente, ClienteListResponse, CrearClienteRequest,
        EstadoCliente,
    },
    indicators::Indicadores,
    pagination::PageMeta,
    payment::{
        ActualizarPagoRequest, CrearPagoRequest, MetodoPago, Pago, PagoListResponse,
        TotalPorMetodo,
    },
    product::{ActualizarProductoRequest, CrearProductoRequest, Producto, ProductoListResponse},
    routine::{
        ActualizarAsignacionRequest, ActualizarRutinaRequest, AsignacionListResponse,
        AsignarRutinaRequest, CrearRutinaRequest, Ejercicio, MiRutina, NivelRutina,
        RutinaAsignada, RutinaListResponse, RutinaResponse,
    },
    session::{
        ActualizarSesionRequest, CrearSesionRequest, RegistrarSalidaRequest, Sesion,
        SesionListResponse,
    },
    trainer::{
        ActualizarEntrenadorRequest, ClaseEntrenador, CrearEntrenadorRequest, DiaSemana,
        EntrenadorListResponse, EntrenadorResponse, Horario,
    },
    transaction::{
        ActualizarTransaccionRequest, CrearTransaccionRequest, ResumenContable,
        TipoTransaccion, Totales, Transaccion, TransaccionListResponse,
    },
    user::{
        ActualizarUsuarioRequest, CrearUsuarioRequest, Rol, UsuarioListResponse,
        UsuarioResponse,
    },
};
use crate::utils::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gym Back Office API",
        version = "1.0.0",
        description = "Members, trainers, classes, sales, accounting, routines and attendance"
    ),
    paths(
        crate::health_check,
        auth::login,
        auth::registro,
        auth::perfil,
        auth::cambiar_password,
        users::list_usuarios,
        users::get_usuario,
        users::create_usuario,
        users::update_usuario,
        users::delete_usuario,
        clients::list_clientes,
        clients::get_cliente,
        clients::create_cliente,
        clients::update_cliente,
        clients::delete_cliente,
        trainers::list_entrenadores,
        trainers::get_entrenador,
        trainers::create_entrenador,
        trainers::update_entrenador,
        trainers::delete_entrenador,
        classes::catalogo,
        classes::disponibilidad,
        classes::list_inscripciones,
        classes::get_inscripcion,
        classes::inscribir,
        classes::cancelar_inscripcion,
        products::list_productos,
        products::get_producto,
        products::create_producto,
        products::update_producto,
        products::delete_producto,
        payments::list_pagos,
        payments::get_pago,
        payments::create_pago,
        payments::update_pago,
        payments::delete_pago,
        accounting::list_transacciones,
        accounting::resumen,
        accounting::get_transaccion,
        accounting::create_transaccion,
        accounting::update_transaccion,
        accounting::delete_transaccion,
        routines::list_rutinas,
        routines::get_rutina,
        routines::create_rutina,
        routines::update_rutina,
        routines::delete_rutina,
        routines::list_asignaciones,
        routines::get_asignacion,
        routines::asignar_rutina,
        routines::update_asignacion,
        routines::delete_asignacion,
        routines::mis_rutinas,
        body_composition::list_composicion,
        body_composition::historial,
        body_composition::get_composicion,
        body_composition::create_composicion,
        body_composition::update_composicion,
        body_composition::delete_composicion,
        sessions::list_sesiones,
        sessions::get_sesion,
        sessions::create_sesion,
        sessions::update_sesion,
        sessions::registrar_salida,
        sessions::delete_sesion,
        indicators::indicadores,
    ),
    components(schemas(
        ErrorBody,
        PageMeta,
        Rol,
        LoginRequest,
        LoginResponse,
        RegistroRequest,
        CambiarPasswordRequest,
        UsuarioResponse,
        UsuarioListResponse,
        CrearUsuarioRequest,
        ActualizarUsuarioRequest,
        EstadoCliente,
        Cliente,
        ClienteListResponse,
        CrearClienteRequest,
        ActualizarClienteRequest,
        DiaSemana,
        Horario,
        ClaseEntrenador,
        EntrenadorResponse,
        EntrenadorListResponse,
        CrearEntrenadorRequest,
        ActualizarEntrenadorRequest,
        ClaseCatalogo,
        Disponibilidad,
        HorarioOcupacion,
        InscripcionClase,
        InscripcionListResponse,
        InscribirRequest,
        Producto,
        ProductoListResponse,
        CrearProductoRequest,
        ActualizarProductoRequest,
        MetodoPago,
        Pago,
        PagoListResponse,
        TotalPorMetodo,
        CrearPagoRequest,
        ActualizarPagoRequest,
        TipoTransaccion,
        Transaccion,
        TransaccionListResponse,
        Totales,
        ResumenContable,
        CrearTransaccionRequest,
        ActualizarTransaccionRequest,
        NivelRutina,
        Ejercicio,
        RutinaResponse,
        RutinaListResponse,
        CrearRutinaRequest,
        ActualizarRutinaRequest,
        RutinaAsignada,
        AsignacionListResponse,
        AsignarRutinaRequest,
        ActualizarAsignacionRequest,
        MiRutina,
        ComposicionCorporal,
        ComposicionListResponse,
        HistorialComposicion,
        CrearComposicionRequest,
        ActualizarComposicionRequest,
        Sesion,
        SesionListResponse,
        CrearSesionRequest,
        ActualizarSesionRequest,
        RegistrarSalidaRequest,
        Indicadores,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Auth", description = "Login, self registration and profile"),
        (name = "Usuarios", description = "Back-office accounts"),
        (name = "Clientes", description = "Gym members"),
        (name = "Entrenadores", description = "Trainers and the classes they run"),
        (name = "Clases", description = "Class catalogue, availability and registrations"),
        (name = "Productos", description = "Products sold at the front desk"),
        (name = "Pagos", description = "Payments, stock and their ledger entry"),
        (name = "Contabilidad", description = "Ledger of income and expenses"),
        (name = "Rutinas", description = "Routine templates and assignments"),
        (name = "Composicion corporal", description = "Body measurements"),
        (name = "Sesiones", description = "Attendance check-in and check-out"),
        (name = "Indicadores", description = "Dashboard figures")
    )
)]
pub struct ApiDoc;

/// Registers the `bearerAuth` scheme referenced by protected operations
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some("Token returned by /api/auth/login"))
                .build();
            components.add_security_scheme("bearerAuth", SecurityScheme::Http(scheme));
        }
    }
}

/// Serve the OpenAPI JSON document at /docs/openapi.json
pub async fn serve_openapi_spec() -> Response {
    match ApiDoc::openapi().to_json() {
        Ok(spec) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            spec,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize OpenAPI document: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}

/// Redirect /docs to /docs/ for proper relative path resolution
pub async fn redirect_to_docs(original_uri: OriginalUri) -> impl IntoResponse {
    let mut path = original_uri.0.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, path)]).into_response()
}

pub use swagger_ui::serve_swagger_ui;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_protected_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/auth/login"));
        assert!(paths.contains_key("/api/pagos/{id}"));
        assert!(paths.contains_key("/api/sesiones/{id}/salida"));
        assert!(paths.contains_key("/api/rutinas/mis-rutinas"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearerAuth"));
        assert!(components.schemas.contains_key("Pago"));
    }
}
