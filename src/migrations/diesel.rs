// Embedded schema migrations for the gym database
// MigrationHarness only works on a sync PgConnection, so every call runs on the blocking pool

use crate::db::diesel_pool::MIGRATIONS;
use diesel::{Connection, PgConnection};
use diesel_migrations::MigrationHarness;
use std::error::Error;
use tracing::{debug, info};

type MigrationResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

fn connect(database_url: &str) -> MigrationResult<PgConnection> {
    PgConnection::establish(database_url)
        .map_err(|e| format!("Cannot open migration connection: {}", e).into())
}

/// Apply every pending migration and return how many ran
pub async fn run_migrations(database_url: &str) -> MigrationResult<usize> {
    let database_url = database_url.to_string();

    let applied = tokio::task::spawn_blocking(move || -> MigrationResult<usize> {
        let mut conn = connect(&database_url)?;
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Migration run failed: {}", e))?;

        for version in &versions {
            debug!(%version, "Migration applied");
        }
        Ok(versions.len())
    })
    .await
    .map_err(|e| format!("Migration task aborted: {}", e))??;

    info!(applied, "Schema migrations finished");
    Ok(applied)
}

/// Inspect the schema without touching it
pub async fn check_migration_status(database_url: &str) -> MigrationResult<MigrationStatus> {
    let database_url = database_url.to_string();

    tokio::task::spawn_blocking(move || -> MigrationResult<MigrationStatus> {
        let mut conn = connect(&database_url)?;
        let applied_count = conn
            .applied_migrations()
            .map_err(|e| format!("Cannot list applied migrations: {}", e))?
            .len();
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Cannot list pending migrations: {}", e))?;

        Ok(MigrationStatus {
            applied_count,
            pending: pending.iter().map(|m| m.name().to_string()).collect(),
        })
    })
    .await
    .map_err(|e| format!("Migration status task aborted: {}", e))?
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied_count: usize,
    /// Names of migrations not yet applied, oldest first
    pub pending: Vec<String>,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_with_pending_migrations() {
        let status = MigrationStatus {
            applied_count: 0,
            pending: vec!["2025-01-15-000000_initial_schema".to_string()],
        };
        assert!(!status.is_up_to_date());

        let status = MigrationStatus {
            applied_count: 1,
            pending: vec![],
        };
        assert!(status.is_up_to_date());
    }

    #[tokio::test]
    async fn test_schema_is_current_after_run() {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("Skipping test: TEST_DATABASE_URL not set");
            return;
        };

        run_migrations(&database_url).await.unwrap();
        let status = check_migration_status(&database_url).await.unwrap();
        assert!(status.is_up_to_date());
        assert!(status.applied_count >= 1);
    }
}
