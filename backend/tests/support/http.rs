//! Shared HTTP helpers for the end-to-end API tests.

use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::Value;
use userpost_api::outbound::memory::{InMemoryRepository, InMemoryStrategy};

/// A fresh in-memory store.
pub(crate) fn memory_store() -> Arc<InMemoryRepository> {
    Arc::new(InMemoryRepository::new())
}

/// A store whose registered operations are replaced by `strategy`.
pub(crate) fn store_with(strategy: InMemoryStrategy) -> Arc<InMemoryRepository> {
    Arc::new(InMemoryRepository::with_strategy(strategy))
}

/// Captured status, `trace-id` header and decoded body of one response.
#[derive(Debug)]
pub(crate) struct Reply {
    pub(crate) status: StatusCode,
    pub(crate) trace_id: Option<String>,
    pub(crate) body: Value,
}

/// Send `request` and decode the JSON body (`Null` when empty).
pub(crate) async fn send<S>(app: &S, request: actix_http::Request) -> Reply
where
    S: Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = actix_test::call_service(app, request).await;
    let status = response.status();
    let trace_id = response
        .headers()
        .get("trace-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };
    Reply {
        status,
        trace_id,
        body,
    }
}
