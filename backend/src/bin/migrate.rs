//! Create (or recreate) the users and posts schema.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};
use userpost_api::outbound::persistence::create_schema;

/// `migrate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "migrate",
    about = "Apply the embedded migrations to a PostgreSQL database",
    version
)]
struct CliArgs {
    /// Database connection URL.
    #[arg(long = "database-url", value_name = "url", env = "CHALLENGE_SERVER_DATABASE_URL")]
    database_url: String,
    /// Drop every table first so the schema starts empty.
    #[arg(long)]
    reset: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = CliArgs::parse();
    create_schema(&args.database_url, args.reset).wrap_err("schema creation failed")
}
