//! Users and posts REST API.
//!
//! Layers follow a hexagonal layout: `domain` holds the entities and the
//! storage port, `inbound` the HTTP adapter, `outbound` the storage adapters,
//! and `middleware` the correlation and request logging shared by every route.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request logging middleware applied to the whole application.
pub use middleware::RequestLogging;
