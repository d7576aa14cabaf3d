// Authentication and role gating at the HTTP layer

use axum::http::{header, StatusCode};
use gym_backend_core::models::user::Rol;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

mod common;
use common::{expect_status, setup_db_test_app, setup_test_app, unique_email, TEST_PASSWORD};

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = setup_test_app();

    for uri in ["/api/clientes", "/api/contabilidad", "/api/auth/perfil", "/api/indicadores"] {
        let response = app.get(uri).send().await;
        let body = expect_status(response, StatusCode::UNAUTHORIZED).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["codigo"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let app = setup_test_app();

    let response = app.get("/api/pagos").bearer("not-a-jwt").send().await;
    let body = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(body["codigo"], "INVALID_TOKEN");

    let response = app
        .get("/api/pagos")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .send()
        .await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
async fn test_token_from_other_issuer_is_rejected() {
    let app = setup_test_app();
    let foreign = gym_backend_core::JwtService::new(gym_backend_core::JwtConfig::new(
        "another-secret-that-is-also-32-characters",
        3600,
        "someone-else",
    ));
    let token = foreign.generate_token(Uuid::new_v4(), Rol::Admin).unwrap();

    let response = app.get("/api/usuarios").bearer(&token).send().await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
async fn test_preflight_is_answered_without_token() {
    let app = setup_test_app();

    let response = app
        .options("/api/clientes")
        .header(header::ORIGIN, "http://localhost:3000")
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN).as_deref(),
        Some("http://localhost:3000")
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app();

    let response = app.get("/docs/openapi.json").send().await;
    let body = expect_status(response, StatusCode::OK).await;
    assert!(body["paths"]["/api/clases/inscripciones"].is_object());
    assert!(body["components"]["securitySchemes"]["bearerAuth"].is_object());
}

#[tokio::test]
#[serial]
async fn test_non_admin_is_forbidden_on_admin_routes() {
    let Some(app) = setup_db_test_app().await else { return };

    for rol in [Rol::Entrenador, Rol::Recepcionista, Rol::Cliente] {
        let (_, token) = app.create_user(rol).await;

        let response = app.get("/api/usuarios").bearer(&token).send().await;
        let body = expect_status(response, StatusCode::FORBIDDEN).await;
        assert_eq!(body["codigo"], "FORBIDDEN");

        let response = app.get("/api/contabilidad").bearer(&token).send().await;
        expect_status(response, StatusCode::FORBIDDEN).await;
    }

    let (_, admin_token) = app.create_user(Rol::Admin).await;
    let response = app.get("/api/usuarios").bearer(&admin_token).send().await;
    expect_status(response, StatusCode::OK).await;
}

#[tokio::test]
#[serial]
async fn test_role_matrix_for_staff() {
    let Some(app) = setup_db_test_app().await else { return };

    let (_, entrenador) = app.create_user(Rol::Entrenador).await;
    let (_, recepcion) = app.create_user(Rol::Recepcionista).await;
    let (_, cliente) = app.create_user(Rol::Cliente).await;

    // Trainers read clients but do not sell
    expect_status(app.get("/api/clientes").bearer(&entrenador).send().await, StatusCode::OK).await;
    expect_status(app.get("/api/pagos").bearer(&entrenador).send().await, StatusCode::FORBIDDEN)
        .await;

    // Reception sells but does not write routines
    expect_status(app.get("/api/pagos").bearer(&recepcion).send().await, StatusCode::OK).await;
    let response = app
        .post("/api/rutinas")
        .bearer(&recepcion)
        .json(&json!({ "nombre": "Full body", "ejercicios": [] }))
        .send()
        .await;
    expect_status(response, StatusCode::FORBIDDEN).await;

    // Clients see the catalogue and their own routines only
    expect_status(app.get("/api/clases").bearer(&cliente).send().await, StatusCode::OK).await;
    expect_status(
        app.get("/api/rutinas/mis-rutinas").bearer(&cliente).send().await,
        StatusCode::OK,
    )
    .await;
    expect_status(app.get("/api/clientes").bearer(&cliente).send().await, StatusCode::FORBIDDEN)
        .await;
    expect_status(
        app.get("/api/rutinas/mis-rutinas").bearer(&recepcion).send().await,
        StatusCode::FORBIDDEN,
    )
    .await;
}

#[tokio::test]
#[serial]
async fn test_deleted_user_token_is_rejected() {
    let Some(app) = setup_db_test_app().await else { return };

    let token = app.token_for(Uuid::new_v4(), Rol::Admin);
    let response = app.get("/api/usuarios").bearer(&token).send().await;
    let body = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(body["codigo"], "ACCOUNT_INACTIVE");
}

#[tokio::test]
#[serial]
async fn test_login_and_profile() {
    let Some(app) = setup_db_test_app().await else { return };

    let email = unique_email("registro");
    let response = app
        .post("/api/auth/registro")
        .json(&json!({ "nombre": "Ana Pérez", "email": email, "password": TEST_PASSWORD }))
        .send()
        .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["data"]["usuario"]["rol"], "cliente");

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "email": email.to_uppercase(), "password": TEST_PASSWORD }))
        .send()
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let response = app.get("/api/auth/perfil").bearer(&token).send().await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["email"], email);
    assert!(body["data"].get("password_hash").is_none());

    let response = app
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": "Equivocada123" }))
        .send()
        .await;
    let body = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(body["codigo"], "INVALID_CREDENTIALS");
}
