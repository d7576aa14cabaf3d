// HTTP handlers and per-resource route builders
// Every protected group splits into a read and a write router, each behind
// its own role gate. `auth_middleware` is layered on top in `build_router`.

pub mod accounting;
pub mod auth;
pub mod body_composition;
pub mod classes;
pub mod clients;
pub mod docs;
pub mod indicators;
pub mod payments;
pub mod products;
pub mod routines;
pub mod sessions;
pub mod trainers;
pub mod users;

use crate::{
    app::AppState,
    config::permissions::{
        ResourcePolicy, ANY_ROLE, ASIGNACIONES, CATALOGO_CLASES, CLIENTES, CLIENTS,
        COMPOSICION_CORPORAL, CONTABILIDAD, ENTRENADORES, INDICADORES, INSCRIPCIONES, PAGOS,
        PRODUCTOS, RUTINAS, SESIONES, USUARIOS,
    },
    middleware::require_roles,
};
use axum::{
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};

/// Read routes gated by `policy.read`, write routes by `policy.write`
fn gated(policy: ResourcePolicy, read: Router<AppState>, write: Router<AppState>) -> Router<AppState> {
    read.route_layer(from_fn(require_roles(policy.read)))
        .merge(write.route_layer(from_fn(require_roles(policy.write))))
}

// Authentication routes that need no token
pub fn public_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/registro", post(auth::registro))
}

// Authentication routes for any signed-in user
pub fn protected_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/perfil", get(auth::perfil))
        .route("/password", put(auth::cambiar_password))
        .route_layer(from_fn(require_roles(ANY_ROLE)))
}

pub fn usuarios_routes() -> Router<AppState> {
    gated(
        USUARIOS,
        Router::new()
            .route("/", get(users::list_usuarios))
            .route("/{id}", get(users::get_usuario)),
        Router::new()
            .route("/", post(users::create_usuario))
            .route(
                "/{id}",
                put(users::update_usuario).delete(users::delete_usuario),
            ),
    )
}

pub fn clientes_routes() -> Router<AppState> {
    gated(
        CLIENTES,
        Router::new()
            .route("/", get(clients::list_clientes))
            .route("/{id}", get(clients::get_cliente)),
        Router::new()
            .route("/", post(clients::create_cliente))
            .route(
                "/{id}",
                put(clients::update_cliente).delete(clients::delete_cliente),
            ),
    )
}

pub fn entrenadores_routes() -> Router<AppState> {
    gated(
        ENTRENADORES,
        Router::new()
            .route("/", get(trainers::list_entrenadores))
            .route("/{id}", get(trainers::get_entrenador)),
        Router::new()
            .route("/", post(trainers::create_entrenador))
            .route(
                "/{id}",
                put(trainers::update_entrenador).delete(trainers::delete_entrenador),
            ),
    )
}

// Catalogue and availability are readable by everyone,
// registrations belong to the staff
pub fn clases_routes() -> Router<AppState> {
    let catalogo = Router::new()
        .route("/", get(classes::catalogo))
        .route("/disponibilidad", get(classes::disponibilidad))
        .route_layer(from_fn(require_roles(CATALOGO_CLASES)));

    let inscripciones = gated(
        INSCRIPCIONES,
        Router::new()
            .route("/inscripciones", get(classes::list_inscripciones))
            .route("/inscripciones/{id}", get(classes::get_inscripcion)),
        Router::new()
            .route("/inscripciones", post(classes::inscribir))
            .route("/inscripciones/{id}", delete(classes::cancelar_inscripcion)),
    );

    catalogo.merge(inscripciones)
}

pub fn productos_routes() -> Router<AppState> {
    gated(
        PRODUCTOS,
        Router::new()
            .route("/", get(products::list_productos))
            .route("/{id}", get(products::get_producto)),
        Router::new()
            .route("/", post(products::create_producto))
            .route(
                "/{id}",
                put(products::update_producto).delete(products::delete_producto),
            ),
    )
}

pub fn pagos_routes() -> Router<AppState> {
    gated(
        PAGOS,
        Router::new()
            .route("/", get(payments::list_pagos))
            .route("/{id}", get(payments::get_pago)),
        Router::new()
            .route("/", post(payments::create_pago))
            .route(
                "/{id}",
                put(payments::update_pago).delete(payments::delete_pago),
            ),
    )
}

pub fn contabilidad_routes() -> Router<AppState> {
    gated(
        CONTABILIDAD,
        Router::new()
            .route("/", get(accounting::list_transacciones))
            .route("/resumen", get(accounting::resumen))
            .route("/{id}", get(accounting::get_transaccion)),
        Router::new()
            .route("/", post(accounting::create_transaccion))
            .route(
                "/{id}",
                put(accounting::update_transaccion).delete(accounting::delete_transaccion),
            ),
    )
}

// Templates, assignments and the client's own view live under one prefix
pub fn rutinas_routes() -> Router<AppState> {
    let plantillas = gated(
        RUTINAS,
        Router::new()
            .route("/", get(routines::list_rutinas))
            .route("/{id}", get(routines::get_rutina)),
        Router::new()
            .route("/", post(routines::create_rutina))
            .route(
                "/{id}",
                put(routines::update_rutina).delete(routines::delete_rutina),
            ),
    );

    let asignaciones = gated(
        ASIGNACIONES,
        Router::new()
            .route("/asignaciones", get(routines::list_asignaciones))
            .route("/asignaciones/{id}", get(routines::get_asignacion)),
        Router::new()
            .route("/asignaciones", post(routines::asignar_rutina))
            .route(
                "/asignaciones/{id}",
                put(routines::update_asignacion).delete(routines::delete_asignacion),
            ),
    );

    let propias = Router::new()
        .route("/mis-rutinas", get(routines::mis_rutinas))
        .route_layer(from_fn(require_roles(CLIENTS)));

    plantillas.merge(asignaciones).merge(propias)
}

pub fn composicion_routes() -> Router<AppState> {
    gated(
        COMPOSICION_CORPORAL,
        Router::new()
            .route("/", get(body_composition::list_composicion))
            .route(
                "/cliente/{identificacion}",
                get(body_composition::historial),
            )
            .route("/{id}", get(body_composition::get_composicion)),
        Router::new()
            .route("/", post(body_composition::create_composicion))
            .route(
                "/{id}",
                put(body_composition::update_composicion)
                    .delete(body_composition::delete_composicion),
            ),
    )
}

pub fn sesiones_routes() -> Router<AppState> {
    gated(
        SESIONES,
        Router::new()
            .route("/", get(sessions::list_sesiones))
            .route("/{id}", get(sessions::get_sesion)),
        Router::new()
            .route("/", post(sessions::create_sesion))
            .route(
                "/{id}",
                put(sessions::update_sesion).delete(sessions::delete_sesion),
            )
            .route("/{id}/salida", post(sessions::registrar_salida)),
    )
}

pub fn indicadores_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(indicators::indicadores))
        .route_layer(from_fn(require_roles(INDICADORES)))
}

/// Every route that requires a bearer token, mounted under `/api`
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", protected_auth_routes())
        .nest("/usuarios", usuarios_routes())
        .nest("/clientes", clientes_routes())
        .nest("/entrenadores", entrenadores_routes())
        .nest("/clases", clases_routes())
        .nest("/productos", productos_routes())
        .nest("/pagos", pagos_routes())
        .nest("/contabilidad", contabilidad_routes())
        .nest("/rutinas", rutinas_routes())
        .nest("/composicion-corporal", composicion_routes())
        .nest("/sesiones", sesiones_routes())
        .nest("/indicadores", indicadores_routes())
}
