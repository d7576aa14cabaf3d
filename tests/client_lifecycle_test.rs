// Client deletion, admin self-protection, measurements and the dashboard

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use gym_backend_core::models::user::Rol;
use serde_json::{json, Value};
use serial_test::serial;

mod common;
use common::{expect_status, setup_db_test_app, unique_identificacion, TestApp};

async fn create_cliente(app: &TestApp, token: &str, extra: Value) -> Value {
    let mut body = json!({
        "identificacion": unique_identificacion(),
        "nombre": "Andrés",
        "apellido": "Pardo"
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }

    let response = app.post("/api/clientes").bearer(token).json(&body).send().await;
    expect_status(response, StatusCode::CREATED).await
}

async fn indicadores(app: &TestApp, token: &str) -> Value {
    expect_status(
        app.get("/api/indicadores").bearer(token).send().await,
        StatusCode::OK,
    )
    .await
}

fn counter(body: &Value, name: &str) -> i64 {
    body[name].as_i64().unwrap()
}

#[tokio::test]
#[serial]
async fn test_client_with_payments_cannot_be_deleted() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, admin) = app.create_user(Rol::Admin).await;

    let cliente = create_cliente(&app, &admin, json!({})).await;
    let response = app
        .post("/api/pagos")
        .bearer(&admin)
        .json(&json!({
            "cliente_id": cliente["id"],
            "monto": 60_000,
            "metodo_pago": "efectivo",
            "concepto": "Mensualidad"
        }))
        .send()
        .await;
    expect_status(response, StatusCode::CREATED).await;

    let uri = format!("/api/clientes/{}", cliente["id"].as_str().unwrap());
    let body = expect_status(app.delete(&uri).bearer(&admin).send().await, StatusCode::CONFLICT).await;
    assert_eq!(body["codigo"], "CONFLICT");
    expect_status(app.get(&uri).bearer(&admin).send().await, StatusCode::OK).await;

    // Without payments the client goes away
    let sin_pagos = create_cliente(&app, &admin, json!({})).await;
    let uri = format!("/api/clientes/{}", sin_pagos["id"].as_str().unwrap());
    expect_status(app.delete(&uri).bearer(&admin).send().await, StatusCode::NO_CONTENT).await;
    expect_status(app.get(&uri).bearer(&admin).send().await, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
#[serial]
async fn test_admin_cannot_remove_own_access() {
    let Some(app) = setup_db_test_app().await else { return };
    let (admin_user, admin) = app.create_user(Rol::Admin).await;
    let uri = format!("/api/usuarios/{}", admin_user.id);

    let body = expect_status(app.delete(&uri).bearer(&admin).send().await, StatusCode::CONFLICT).await;
    assert_eq!(body["codigo"], "CONFLICT");

    let response = app
        .put(&uri)
        .bearer(&admin)
        .json(&json!({ "activo": false }))
        .send()
        .await;
    expect_status(response, StatusCode::CONFLICT).await;

    let response = app
        .put(&uri)
        .bearer(&admin)
        .json(&json!({ "rol": "cliente" }))
        .send()
        .await;
    expect_status(response, StatusCode::CONFLICT).await;

    // Still an active admin after the rejected edits
    let body = expect_status(app.get(&uri).bearer(&admin).send().await, StatusCode::OK).await;
    assert_eq!(body["rol"], "admin");
    assert_eq!(body["activo"], true);

    // Renaming oneself is fine
    let response = app
        .put(&uri)
        .bearer(&admin)
        .json(&json!({ "nombre": "Administración" }))
        .send()
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["nombre"], "Administración");
}

#[tokio::test]
#[serial]
async fn test_huge_page_number_is_served() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, admin) = app.create_user(Rol::Admin).await;

    let response = app
        .get("/api/clientes?page=9223372036854775807&per_page=9223372036854775807")
        .bearer(&admin)
        .send()
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_body_composition_history() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, entrenador) = app.create_user(Rol::Entrenador).await;
    let (_, recepcion) = app.create_user(Rol::Recepcionista).await;

    let cliente = create_cliente(&app, &recepcion, json!({})).await;
    let identificacion = cliente["identificacion"].as_str().unwrap().to_string();

    // Recorded out of order; the history sorts by date
    for (fecha, peso) in [("2024-03-01", 78.3), ("2024-01-10", 82.5)] {
        let response = app
            .post("/api/composicion-corporal")
            .bearer(&entrenador)
            .json(&json!({
                "cliente_identificacion": identificacion,
                "fecha": fecha,
                "peso_kg": peso,
                "altura_cm": 175.0
            }))
            .send()
            .await;
        expect_status(response, StatusCode::CREATED).await;
    }

    let uri = format!("/api/composicion-corporal/cliente/{}", identificacion);
    let body = expect_status(app.get(&uri).bearer(&recepcion).send().await, StatusCode::OK).await;
    assert_eq!(body["cliente_identificacion"], identificacion.as_str());

    let registros = body["registros"].as_array().unwrap();
    assert_eq!(registros.len(), 2);
    assert_eq!(registros[0]["fecha"], "2024-01-10");
    assert_eq!(body["ultimo"]["fecha"], "2024-03-01");
    assert_eq!(body["ultimo"]["peso_kg"], 78.3);
    assert_eq!(body["variacion_peso_kg"], -4.2);

    let response = app
        .get("/api/composicion-corporal/cliente/NO-EXISTE-000")
        .bearer(&recepcion)
        .send()
        .await;
    expect_status(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
#[serial]
async fn test_dashboard_counters_follow_activity() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, admin) = app.create_user(Rol::Admin).await;
    let (_, recepcion) = app.create_user(Rol::Recepcionista).await;

    let antes = indicadores(&app, &recepcion).await;

    let vence = (Utc::now().date_naive() + Duration::days(3)).to_string();
    let cliente = create_cliente(&app, &admin, json!({ "fecha_vencimiento": vence })).await;

    let response = app
        .post("/api/sesiones")
        .bearer(&recepcion)
        .json(&json!({ "cliente_id": cliente["id"] }))
        .send()
        .await;
    expect_status(response, StatusCode::CREATED).await;

    let response = app
        .post("/api/contabilidad")
        .bearer(&admin)
        .json(&json!({ "tipo": "ingreso", "categoria": "Otros", "monto": 12_345 }))
        .send()
        .await;
    expect_status(response, StatusCode::CREATED).await;

    let response = app
        .post("/api/contabilidad")
        .bearer(&admin)
        .json(&json!({ "tipo": "egreso", "categoria": "Servicios", "monto": 2_345 }))
        .send()
        .await;
    expect_status(response, StatusCode::CREATED).await;

    let despues = indicadores(&app, &recepcion).await;
    assert_eq!(despues["fecha"], Utc::now().date_naive().to_string());

    let delta = |name: &str| counter(&despues, name) - counter(&antes, name);
    assert_eq!(delta("clientes_activos"), 1);
    assert_eq!(delta("clientes_nuevos_mes"), 1);
    assert_eq!(delta("membresias_por_vencer"), 1);
    assert_eq!(delta("asistencias_hoy"), 1);
    assert_eq!(delta("sesiones_abiertas"), 1);
    assert_eq!(delta("ingresos_mes"), 12_345);
    assert_eq!(delta("egresos_mes"), 2_345);
    assert_eq!(delta("balance_mes"), 10_000);
    assert_eq!(delta("entrenadores_activos"), 0);
    assert_eq!(delta("rutinas_activas"), 0);

    // Clients never see the dashboard
    let (_, cliente_token) = app.create_user(Rol::Cliente).await;
    expect_status(
        app.get("/api/indicadores").bearer(&cliente_token).send().await,
        StatusCode::FORBIDDEN,
    )
    .await;
}
