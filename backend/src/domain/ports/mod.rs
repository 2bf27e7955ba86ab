//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod repository;

#[cfg(test)]
pub use repository::MockDbRepository;
pub use repository::{ConnectionStats, DbRepository, RepositoryError};
