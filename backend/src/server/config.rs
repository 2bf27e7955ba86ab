//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use userpost_api::domain::ports::DbRepository;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) repository: Arc<dyn DbRepository>,
    pub(crate) dev_mode: bool,
    pub(crate) store_timeout: Duration,
}

impl ServerConfig {
    /// Construct a configuration serving `repository` on `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, repository: Arc<dyn DbRepository>) -> Self {
        Self {
            bind_addr,
            repository,
            dev_mode: false,
            store_timeout: Duration::from_secs(5),
        }
    }

    /// Serve Swagger UI under `/docs`.
    #[must_use]
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Deadline for each storage call.
    #[must_use]
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use userpost_api::outbound::memory::InMemoryRepository;

    #[test]
    fn builder_overrides_defaults() {
        let addr: SocketAddr = "127.0.0.1:3000".parse().expect("addr");
        let config = ServerConfig::new(addr, Arc::new(InMemoryRepository::new()))
            .with_dev_mode(true)
            .with_store_timeout(Duration::from_millis(50));

        assert_eq!(config.bind_addr, addr);
        assert!(config.dev_mode);
        assert_eq!(config.store_timeout, Duration::from_millis(50));
    }
}
