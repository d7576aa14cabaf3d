// Library exports for the gym back-office backend
// main.rs and the integration tests build the application through here

pub mod app;
pub mod app_config;
pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::AppConfig;
pub use db::DieselPool;
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use models::auth::Claims;
pub use services::{JwtConfig, JwtError, JwtService};

/// Build the shared state: pool, migrations, bootstrap admin and JWT service
pub async fn initialize_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    info!("Initializing database pool...");
    let db_config = db::DieselDatabaseConfig::from(&config.database);
    let max_connections = db_config.max_connections;
    let diesel_pool = db::create_diesel_pool(db_config).await?;

    migrations::prepare_schema(config)
        .await
        .map_err(|e| anyhow::anyhow!("Schema preparation failed: {}", e))?;

    let created = services::UserService::with_pool(diesel_pool.clone())
        .ensure_admin(&config.bootstrap)
        .await
        .map_err(|e| anyhow::anyhow!("Admin bootstrap failed: {}", e))?;
    if created {
        info!("Bootstrap admin account created");
    }

    Ok(AppState {
        config: Arc::new(config.clone()),
        diesel_pool,
        jwt_service: Arc::new(JwtService::from_app_config(config)),
        max_connections,
    })
}

/// Assemble the full router: public auth, protected API, docs and health
pub fn build_router(state: AppState) -> Router {
    let protected =
        handlers::protected_routes().route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", handlers::public_auth_routes())
        .nest("/api", protected);

    if state.config.features.enable_swagger_ui {
        router = router
            .route("/docs", get(handlers::docs::redirect_to_docs))
            .route("/docs/", get(handlers::docs::serve_swagger_ui))
            .route("/docs/openapi.json", get(handlers::docs::serve_openapi_spec));
    }

    router
        .layer(from_fn_with_state(
            state.clone(),
            middleware::dynamic_cors_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "healthCheck",
    responses(
        (status = 200, description = "Service and database are healthy"),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let (healthy, postgres_health) = match db::check_diesel_health(&state.diesel_pool).await {
        Ok(()) => (
            true,
            serde_json::json!({
                "status": "healthy",
                "max_connections": state.max_connections,
                "error": null
            }),
        ),
        Err(e) => (
            false,
            serde_json::json!({
                "status": "unhealthy",
                "error": format!("Database connection failed: {}", e)
            }),
        ),
    };

    let response = serde_json::json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "gym-backend",
        "timestamp": timestamp,
        "components": {
            "postgresql": postgres_health
        }
    });

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
