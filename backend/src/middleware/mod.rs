//! Request middleware.
//!
//! Purpose: correlation ids, request/response logging and the request-scoped
//! context that handlers receive as an extractor.

mod context;
pub mod request_logging;

pub use context::RequestContext;
pub use request_logging::RequestLogging;
