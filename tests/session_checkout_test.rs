// Attendance check-in and check-out

use axum::http::StatusCode;
use gym_backend_core::models::user::Rol;
use serde_json::json;
use serial_test::serial;

mod common;
use common::{expect_status, setup_db_test_app, unique_identificacion};

#[tokio::test]
#[serial]
async fn test_session_closes_once() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, recepcion) = app.create_user(Rol::Recepcionista).await;

    let response = app
        .post("/api/clientes")
        .bearer(&recepcion)
        .json(&json!({
            "identificacion": unique_identificacion(),
            "nombre": "Sofía",
            "apellido": "Castro"
        }))
        .send()
        .await;
    let cliente = expect_status(response, StatusCode::CREATED).await;

    let response = app
        .post("/api/sesiones")
        .bearer(&recepcion)
        .json(&json!({
            "cliente_id": cliente["id"],
            "hora_entrada": "2024-06-01T10:00:00Z"
        }))
        .send()
        .await;
    let sesion = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(sesion["fecha"], "2024-06-01");
    assert!(sesion["hora_salida"].is_null());

    let uri = format!("/api/sesiones/{}/salida", sesion["id"].as_str().unwrap());
    let response = app
        .post(&uri)
        .bearer(&recepcion)
        .json(&json!({ "hora_salida": "2024-06-01T11:30:00Z" }))
        .send()
        .await;
    let cerrada = expect_status(response, StatusCode::OK).await;
    assert_eq!(cerrada["hora_salida"], "2024-06-01T11:30:00Z");

    let response = app.post(&uri).bearer(&recepcion).send().await;
    expect_status(response, StatusCode::CONFLICT).await;
}

#[tokio::test]
#[serial]
async fn test_checkout_before_entry_is_rejected() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, admin) = app.create_user(Rol::Admin).await;

    let response = app
        .post("/api/clientes")
        .bearer(&admin)
        .json(&json!({
            "identificacion": unique_identificacion(),
            "nombre": "Diego",
            "apellido": "Mora"
        }))
        .send()
        .await;
    let cliente = expect_status(response, StatusCode::CREATED).await;

    let response = app
        .post("/api/sesiones")
        .bearer(&admin)
        .json(&json!({
            "cliente_id": cliente["id"],
            "hora_entrada": "2024-06-01T10:00:00Z",
            "hora_salida": "2024-06-01T09:00:00Z"
        }))
        .send()
        .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["codigo"], "VALIDATION_ERROR");
}
