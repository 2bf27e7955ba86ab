//! Correlation-aware request logging.
//!
//! For every request the middleware:
//! 1. takes a correlation id from the injected [`TraceIdSource`] and the start
//!    instant from the injected [`Clock`];
//! 2. opens a `request` span and stores a [`RequestContext`] in the request
//!    extensions;
//! 3. buffers the request payload up to the body limit, logs `processing
//!    request`, and replays the payload unchanged to the handler; a body over
//!    the limit or one that fails mid-read is answered with a 422 instead;
//! 4. buffers the response body, logs `response sent` with the status and the
//!    elapsed microseconds, and re-emits the body unchanged;
//! 5. echoes the id in the `trace-id` response header.
//!
//! Steps 4 and 5 also run when the body is rejected or the downstream
//! service fails.
//!
//! The downstream service runs inside [`TraceId::scope`], so
//! [`TraceId::current`] resolves anywhere in the request.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use actix_web::body::{self, BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::web::{Bytes, BytesMut};
use actix_web::error::PayloadError;
use actix_web::{Error, HttpMessage, ResponseError};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use mockable::{Clock, DefaultClock};
use tracing::{Instrument, Span, error, info, info_span};

use crate::domain::{Error as DomainError, RandomTraceIds, TRACE_ID_HEADER, TraceId, TraceIdSource};
use crate::inbound::http::validation::BAD_ENTITY;

use super::context::RequestContext;

/// Header names whose values never reach the logs.
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
    "proxy-authorization",
];

const REDACTED: &str = "[REDACTED]";
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest request body, in bytes, buffered before the request is rejected.
pub const DEFAULT_BODY_LIMIT: usize = 256 * 1024;

/// Why a request body never reached the handler.
#[derive(Debug, thiserror::Error)]
enum BodyRejection {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("request body unreadable: {0}")]
    Read(#[from] PayloadError),
}

/// Logging middleware factory.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use actix_web::App;
/// use mockable::DefaultClock;
/// use userpost_api::RequestLogging;
/// use userpost_api::domain::RandomTraceIds;
///
/// let _app = App::new().wrap(RequestLogging::new(
///     Arc::new(DefaultClock),
///     Arc::new(RandomTraceIds),
/// ));
/// ```
#[derive(Clone)]
pub struct RequestLogging {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn TraceIdSource>,
    store_timeout: Duration,
    body_limit: usize,
}

impl RequestLogging {
    /// Build the middleware from a time source and an id source.
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn TraceIdSource>) -> Self {
        Self {
            clock,
            ids,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Deadline applied to storage calls made through [`RequestContext::run_store`].
    #[must_use]
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Reject bodies longer than `body_limit` bytes with a 422.
    ///
    /// Keep this at or below the `web::PayloadConfig` limit so the middleware
    /// answers before any extractor does.
    #[must_use]
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

impl Default for RequestLogging {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock), Arc::new(RandomTraceIds))
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLogging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggingMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggingMiddleware {
            service: Rc::new(service),
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
            store_timeout: self.store_timeout,
            body_limit: self.body_limit,
        }))
    }
}

/// Service wrapper produced by [`RequestLogging`].
///
/// Applications should not use this type directly.
pub struct RequestLoggingMiddleware<S> {
    service: Rc<S>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn TraceIdSource>,
    store_timeout: Duration,
    body_limit: usize,
}

impl<S, B> Service<ServiceRequest> for RequestLoggingMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let clock = Arc::clone(&self.clock);
        let trace_id = self.ids.next_id();
        let start = clock.utc();
        let span = request_span(&req, trace_id);
        req.extensions_mut().insert(RequestContext::new(
            trace_id,
            span.clone(),
            self.store_timeout,
        ));

        let body_limit = self.body_limit;

        let logged = async move {
            let res = match buffer_request(&mut req, body_limit).await {
                Ok(request_body) => {
                    let request_body =
                        (!request_body.is_empty()).then(|| String::from_utf8_lossy(&request_body));
                    info!(
                        request_body = request_body.as_deref(),
                        request_headers = ?redacted_headers(req.headers()),
                        "processing request"
                    );
                    let http_req = req.request().clone();
                    match service.call(req).await {
                        Ok(res) => res.map_into_boxed_body(),
                        Err(err) => {
                            error!(%err, "downstream service failed");
                            ServiceResponse::from_err(err, http_req)
                        }
                    }
                }
                Err(rejection) => {
                    info!(
                        reason = %rejection,
                        request_headers = ?redacted_headers(req.headers()),
                        "request body rejected"
                    );
                    req.error_response(DomainError::unprocessable_entity(BAD_ENTITY))
                }
            };
            Ok::<_, Error>(finish(res, trace_id, start, clock.as_ref()).await)
        };

        Box::pin(TraceId::scope(trace_id, logged.instrument(span)))
    }
}

fn request_span(req: &ServiceRequest, trace_id: TraceId) -> Span {
    let client_ip = req
        .peer_addr()
        .map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string());
    let user_agent = req
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    info_span!(
        "request",
        method = %req.method(),
        path = %req.path(),
        client_ip = %client_ip,
        user_agent = %user_agent,
        request_id = %trace_id,
    )
}

/// Buffer the response, stamp the trace header and log the outcome.
async fn finish(
    res: ServiceResponse<BoxBody>,
    trace_id: TraceId,
    start: DateTime<Utc>,
    clock: &dyn Clock,
) -> ServiceResponse<BoxBody> {
    let (http_req, response) = res.into_parts();
    let (head, body) = response.into_parts();
    let (mut head, response_body) = match body::to_bytes(body).await {
        Ok(bytes) => (head, bytes),
        Err(err) => {
            error!(%err, "failed to buffer response body");
            let (head, body) = DomainError::internal("response body unavailable")
                .error_response()
                .into_parts();
            (head, body::to_bytes(body).await.unwrap_or_default())
        }
    };

    insert_trace_header(head.headers_mut(), trace_id);
    info!(
        status = head.status().as_u16(),
        response_body = %String::from_utf8_lossy(&response_body),
        response_headers = ?redacted_headers(head.headers()),
        duration_us = elapsed_micros(start, clock.utc()),
        "response sent"
    );

    let response = head.set_body(BoxBody::new(response_body));
    ServiceResponse::new(http_req, response)
}

/// Drain the payload and put an identical one back for the handler.
///
/// Reading stops as soon as more than `limit` bytes have arrived.
async fn buffer_request(req: &mut ServiceRequest, limit: usize) -> Result<Bytes, BodyRejection> {
    let mut payload = req.take_payload();
    let mut buffered = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if buffered.len() + chunk.len() > limit {
            return Err(BodyRejection::TooLarge { limit });
        }
        buffered.extend_from_slice(&chunk);
    }
    let buffered = buffered.freeze();

    let (_, mut replay) = actix_http::h1::Payload::create(true);
    replay.unread_data(buffered.clone());
    req.set_payload(replay.into());
    Ok(buffered)
}

fn insert_trace_header(headers: &mut HeaderMap, trace_id: TraceId) {
    match HeaderValue::from_str(&trace_id.to_string()) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => {
            error!(%error, trace_id = %trace_id, "failed to encode trace identifier header");
        }
    }
}

/// Header map with sensitive values masked and non-text values elided.
fn redacted_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let rendered = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                REDACTED.to_owned()
            } else {
                value.to_str().unwrap_or("<binary>").to_owned()
            };
            (name.as_str().to_owned(), rendered)
        })
        .collect()
}

/// Microseconds between two clock readings; zero if the clock went backwards.
fn elapsed_micros(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    (end - start)
        .to_std()
        .map_or(0, |elapsed| u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX))
}
