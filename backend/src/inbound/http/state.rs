//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data`, so they depend only
//! on the storage port and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::DbRepository;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub repository: Arc<dyn DbRepository>,
}

impl HttpState {
    /// Construct state around a storage backend.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use userpost_api::inbound::http::state::HttpState;
    /// use userpost_api::outbound::memory::InMemoryRepository;
    ///
    /// let state = HttpState::new(Arc::new(InMemoryRepository::new()));
    /// assert!(state.repository.connection().is_none());
    /// ```
    pub fn new(repository: Arc<dyn DbRepository>) -> Self {
        Self { repository }
    }
}
