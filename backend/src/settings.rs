//! Process configuration loaded via OrthoConfig.
//!
//! Every field can be set through a `CHALLENGE_SERVER_*` environment variable
//! or the matching command-line flag.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Settings for the API process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CHALLENGE_SERVER")]
pub struct AppSettings {
    /// TCP port to listen on.
    #[ortho_config(default = 3000)]
    pub port: u16,
    /// Emit JSON logs and hide the API docs.
    #[ortho_config(default = false)]
    pub is_production: bool,
    /// PostgreSQL URL. Without one the service runs on the in-memory store.
    pub database_url: Option<String>,
    /// Upper bound on open database connections.
    #[ortho_config(default = 100)]
    pub db_max_open: u32,
    /// Idle connections the pool keeps warm.
    #[ortho_config(default = 10)]
    pub db_max_idle: u32,
    /// Seconds before a connection is recycled.
    #[ortho_config(default = 3600)]
    pub db_max_lifetime_secs: u64,
    /// Deadline for a single storage call, in milliseconds.
    #[ortho_config(default = 5000)]
    pub store_timeout_ms: u64,
}

impl AppSettings {
    /// Development mode serves Swagger UI and human-readable logs.
    pub fn is_dev(&self) -> bool {
        !self.is_production
    }

    pub fn db_max_lifetime(&self) -> Duration {
        Duration::from_secs(self.db_max_lifetime_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}
