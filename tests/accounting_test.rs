// Ledger filters and totals

use axum::http::StatusCode;
use gym_backend_core::models::user::Rol;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

mod common;
use common::{expect_status, setup_db_test_app, TestApp};

async fn registrar(app: &TestApp, token: &str, tipo: &str, categoria: &str, monto: i64, fecha: &str) {
    let response = app
        .post("/api/contabilidad")
        .bearer(token)
        .json(&json!({
            "tipo": tipo,
            "categoria": categoria,
            "monto": monto,
            "fecha": fecha
        }))
        .send()
        .await;
    expect_status(response, StatusCode::CREATED).await;
}

#[tokio::test]
#[serial]
async fn test_totals_follow_filters() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, admin) = app.create_user(Rol::Admin).await;

    let categoria = format!("cat-{}", Uuid::new_v4().simple());
    registrar(&app, &admin, "ingreso", &categoria, 120_000, "2024-03-05").await;
    registrar(&app, &admin, "ingreso", &categoria, 30_000, "2024-03-20").await;
    registrar(&app, &admin, "egreso", &categoria, 45_000, "2024-03-10").await;
    registrar(&app, &admin, "egreso", &categoria, 99_000, "2024-04-02").await;

    let uri = format!(
        "/api/contabilidad?categoria={}&desde=2024-03-01&hasta=2024-03-31",
        categoria
    );
    let body = expect_status(app.get(&uri).bearer(&admin).send().await, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["paginacion"]["total"], 3);
    assert_eq!(body["total_ingresos"], 150_000);
    assert_eq!(body["total_egresos"], 45_000);
    assert_eq!(body["balance"], 105_000);

    let uri = format!("/api/contabilidad?categoria={}&tipo=egreso", categoria);
    let body = expect_status(app.get(&uri).bearer(&admin).send().await, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_ingresos"], 0);
    assert_eq!(body["balance"], -144_000);

    let uri = format!("/api/contabilidad/resumen?categoria={}", categoria);
    let body = expect_status(app.get(&uri).bearer(&admin).send().await, StatusCode::OK).await;
    assert_eq!(body["total_ingresos"], 150_000);
    assert_eq!(body["total_egresos"], 144_000);
    assert_eq!(body["balance"], 6_000);
}

#[tokio::test]
#[serial]
async fn test_inverted_range_is_rejected() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, admin) = app.create_user(Rol::Admin).await;

    let response = app
        .get("/api/contabilidad?desde=2024-05-01&hasta=2024-04-01")
        .bearer(&admin)
        .send()
        .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["codigo"], "VALIDATION_ERROR");

    let response = app
        .post("/api/contabilidad")
        .bearer(&admin)
        .json(&json!({ "tipo": "egreso", "monto": 0 }))
        .send()
        .await;
    expect_status(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
#[serial]
async fn test_manual_entry_can_be_edited_and_removed() {
    let Some(app) = setup_db_test_app().await else { return };
    let (_, admin) = app.create_user(Rol::Admin).await;

    let response = app
        .post("/api/contabilidad")
        .bearer(&admin)
        .json(&json!({ "tipo": "egreso", "categoria": "Mantenimiento", "monto": 60_000 }))
        .send()
        .await;
    let creada = expect_status(response, StatusCode::CREATED).await;
    assert!(creada["pago_id"].is_null());

    let uri = format!("/api/contabilidad/{}", creada["id"].as_str().unwrap());
    let response = app
        .put(&uri)
        .bearer(&admin)
        .json(&json!({ "monto": 65_000 }))
        .send()
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["monto"], 65_000);
    assert_eq!(body["categoria"], "Mantenimiento");

    expect_status(app.delete(&uri).bearer(&admin).send().await, StatusCode::NO_CONTENT).await;
    expect_status(app.get(&uri).bearer(&admin).send().await, StatusCode::NOT_FOUND).await;
}
