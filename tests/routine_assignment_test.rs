// Routine templates, assignments and the client's own view

use axum::http::StatusCode;
use gym_backend_core::models::user::Rol;
use serde_json::{json, Value};
use serial_test::serial;
use uuid::Uuid;

mod common;
use common::{expect_status, setup_db_test_app, unique_identificacion, TestApp};

async fn create_cliente(app: &TestApp, token: &str, usuario_id: Option<Uuid>) -> Value {
    let response = app
        .post("/api/clientes")
        .bearer(token)
        .json(&json!({
            "identificacion": unique_identificacion(),
            "nombre": "Valentina",
            "apellido": "Rojas",
            "usuario_id": usuario_id
        }))
        .send()
        .await;
    expect_status(response, StatusCode::CREATED).await
}

async fn create_rutina(app: &TestApp, token: &str, nombre: &str) -> Value {
    let response = app
        .post("/api/rutinas")
        .bearer(token)
        .json(&json!({
            "nombre": nombre,
            "nivel": "principiante",
            "ejercicios": [
                { "nombre": "Sentadilla", "series": 4, "repeticiones": 12 },
                { "nombre": "Plancha", "series": 3, "repeticiones": 1, "descanso_segundos": 60 }
            ]
        }))
        .send()
        .await;
    expect_status(response, StatusCode::CREATED).await
}

async fn asignar(app: &TestApp, token: &str, cliente: &Value, rutina: &Value, activa: bool) -> Value {
    let response = app
        .post("/api/rutinas/asignaciones")
        .bearer(token)
        .json(&json!({
            "cliente_id": cliente["id"],
            "rutina_id": rutina["id"],
            "dias_entrenamiento": ["lunes", "miercoles", "viernes"],
            "dias_descanso": ["domingo"],
            "activa": activa
        }))
        .send()
        .await;
    expect_status(response, StatusCode::CREATED).await
}

#[tokio::test]
#[serial]
async fn test_client_sees_only_own_active_routines() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, recepcion) = app.create_user(Rol::Recepcionista).await;
    let (_, entrenador) = app.create_user(Rol::Entrenador).await;
    let (usuario, cliente_token) = app.create_user(Rol::Cliente).await;
    let (otro_usuario, _) = app.create_user(Rol::Cliente).await;

    let cliente = create_cliente(&app, &recepcion, Some(usuario.id)).await;
    let otro = create_cliente(&app, &recepcion, Some(otro_usuario.id)).await;

    let fuerza = create_rutina(&app, &entrenador, "Fuerza básica").await;
    let movilidad = create_rutina(&app, &entrenador, "Movilidad").await;

    let activa = asignar(&app, &entrenador, &cliente, &fuerza, true).await;
    asignar(&app, &entrenador, &cliente, &movilidad, false).await;
    asignar(&app, &entrenador, &otro, &movilidad, true).await;

    let response = app
        .get("/api/rutinas/mis-rutinas")
        .bearer(&cliente_token)
        .send()
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    let propias = body.as_array().unwrap();
    assert_eq!(propias.len(), 1);
    assert_eq!(propias[0]["asignacion"]["id"], activa["id"]);
    assert_eq!(propias[0]["asignacion"]["cliente_id"], cliente["id"]);
    assert_eq!(propias[0]["rutina"]["id"], fuerza["id"]);
    assert_eq!(propias[0]["rutina"]["ejercicios"].as_array().unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_unlinked_client_account_has_no_routines() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, cliente_token) = app.create_user(Rol::Cliente).await;

    let response = app
        .get("/api/rutinas/mis-rutinas")
        .bearer(&cliente_token)
        .send()
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert!(body.as_array().unwrap().is_empty());

    // Staff have no own routines to look at
    let (_, entrenador) = app.create_user(Rol::Entrenador).await;
    let response = app
        .get("/api/rutinas/mis-rutinas")
        .bearer(&entrenador)
        .send()
        .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
#[serial]
async fn test_assignment_requires_training_days() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, recepcion) = app.create_user(Rol::Recepcionista).await;
    let (_, entrenador) = app.create_user(Rol::Entrenador).await;

    let cliente = create_cliente(&app, &recepcion, None).await;
    let rutina = create_rutina(&app, &entrenador, "Cardio").await;

    let response = app
        .post("/api/rutinas/asignaciones")
        .bearer(&entrenador)
        .json(&json!({
            "cliente_id": cliente["id"],
            "rutina_id": rutina["id"],
            "dias_entrenamiento": []
        }))
        .send()
        .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["codigo"], "VALIDATION_ERROR");

    // Receptionists read assignments but cannot create them
    let response = app
        .post("/api/rutinas/asignaciones")
        .bearer(&recepcion)
        .json(&json!({
            "cliente_id": cliente["id"],
            "rutina_id": rutina["id"],
            "dias_entrenamiento": ["martes"]
        }))
        .send()
        .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}
