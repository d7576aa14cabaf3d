// Schema management at startup
// Migrations are embedded in the binary so deployments need no diesel CLI

pub mod diesel;

use crate::app_config::AppConfig;
use std::error::Error;
use tracing::{error, info, warn};

/// Apply the embedded migrations, or only report drift when they are disabled
pub async fn prepare_schema(config: &AppConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    if !should_run_migrations(config) {
        let status = diesel::check_migration_status(&config.database.url).await?;
        if !status.is_up_to_date() {
            warn!(
                pending = ?status.pending,
                "Embedded migrations are disabled and the schema is behind"
            );
        }
        return Ok(());
    }

    info!(environment = %config.environment, "Applying embedded migrations");
    if let Err(e) = diesel::run_migrations(&config.database.url).await {
        error!("Migration failed: {}", e);
        return Err(e);
    }
    Ok(())
}

pub fn should_run_migrations(config: &AppConfig) -> bool {
    !config.features.disable_embedded_migrations
}
