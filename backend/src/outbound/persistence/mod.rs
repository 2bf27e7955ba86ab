//! PostgreSQL persistence adapter using Diesel.
//!
//! - **Thin adapter**: [`DieselRepository`] only translates between Diesel
//!   rows and domain records.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Async pooling**: connections come from a `bb8` pool through
//!   `diesel-async`.
//! - **Typed errors**: every Diesel and pool failure is mapped to
//!   `RepositoryError` before it leaves the adapter.
//!
//! # Example
//!
//! ```ignore
//! use userpost_api::outbound::persistence::{DbPool, DieselRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/posts")).await?;
//! let repo = DieselRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_repository::DieselRepository;
pub use migrations::{MigrationError, create_schema};
pub use pool::{DbPool, PoolConfig, PoolError};
