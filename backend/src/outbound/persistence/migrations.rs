//! Schema creation from the embedded `migrations/` directory.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failures while preparing the schema.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect to database: {0}")]
    Connect(#[from] diesel::ConnectionError),
    /// A migration failed to apply or revert.
    #[error("migration failed: {0}")]
    Run(String),
}

/// Apply pending migrations. With `reset`, revert every applied migration
/// first so the schema is recreated empty.
///
/// # Errors
///
/// Returns [`MigrationError`] when the connection or a migration fails.
pub fn create_schema(database_url: &str, reset: bool) -> Result<(), MigrationError> {
    let mut conn = PgConnection::establish(database_url)?;
    if reset {
        let reverted = conn
            .revert_all_migrations(MIGRATIONS)
            .map_err(|err| MigrationError::Run(err.to_string()))?;
        info!(count = reverted.len(), "reverted migrations");
    }
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Run(err.to_string()))?;
    info!(count = applied.len(), "applied migrations");
    Ok(())
}
