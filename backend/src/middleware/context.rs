//! Request-scoped logging context handed from the middleware to handlers.

use std::future::Future;
use std::time::Duration;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};
use tracing::{Span, error, info_span};

use crate::domain::ports::RepositoryError;
use crate::domain::{Error, TraceId};

/// Correlation id, request span and storage deadline of one request.
///
/// Only [`RequestLogging`](super::RequestLogging) can build one, so a handler
/// that receives a `RequestContext` knows the request is being logged.
/// Extracting it from a request the middleware did not see fails with 500.
#[derive(Debug, Clone)]
pub struct RequestContext {
    trace_id: TraceId,
    span: Span,
    store_timeout: Duration,
}

impl RequestContext {
    pub(super) fn new(trace_id: TraceId, span: Span, store_timeout: Duration) -> Self {
        Self {
            trace_id,
            span,
            store_timeout,
        }
    }

    /// Correlation identifier shared by every log record of the request.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Span opened by the middleware for the whole request.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Child span naming the handler that serves the request.
    pub fn handler_span(&self, handler: &'static str) -> Span {
        info_span!(parent: &self.span, "handler", handler)
    }

    /// Await a storage call under the request's deadline.
    ///
    /// An elapsed deadline is reported as [`RepositoryError::Unavailable`];
    /// the storage future is dropped at that point.
    pub async fn run_store<T, F>(&self, call: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RepositoryError::unavailable(format!(
                "storage call exceeded {}ms",
                self.store_timeout.as_millis()
            ))),
        }
    }
}

impl FromRequest for RequestContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let context = req.extensions().get::<RequestContext>().cloned();
        ready(context.ok_or_else(|| {
            error!(
                path = %req.path(),
                "request context missing; RequestLogging is not installed"
            );
            Error::internal("request context unavailable")
        }))
    }
}
