//! Test utilities for the crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled only for tests or with the `test-support` feature.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use crate::RequestLogging;
use crate::domain::ports::DbRepository;
use crate::domain::{TraceId, TraceIdSource};
use crate::inbound::http::configure;
use crate::inbound::http::state::HttpState;

/// Clock that returns its current instant and then moves forward by `step`.
///
/// The logging middleware reads the clock once on entry and once on exit, so
/// every request observes a duration of exactly `step`.
pub struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            now: Mutex::new(start),
            step,
        }
    }

    /// A clock that never moves.
    pub fn frozen(at: DateTime<Utc>) -> Self {
        Self::new(at, TimeDelta::zero())
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.now.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut now = self.lock_clock();
        let current = *now;
        *now = current + self.step;
        current
    }
}

/// Deterministic ids `00000000-0000-0000-0000-000000000001`, `...02`, ...
#[derive(Debug, Default)]
pub struct SequentialTraceIds(AtomicU64);

impl TraceIdSource for SequentialTraceIds {
    fn next_id(&self) -> TraceId {
        let next = self.0.fetch_add(1, Ordering::Relaxed) + 1;
        TraceId::from_uuid(Uuid::from_u128(u128::from(next)))
    }
}

/// Start instant used by [`test_app`].
pub fn fixed_start() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).single() {
        Some(instant) => instant,
        None => panic!("fixed start instant"),
    }
}

/// Logging middleware with sequential ids and a clock stepping 1500µs.
pub fn deterministic_logging() -> RequestLogging {
    RequestLogging::new(
        Arc::new(SteppingClock::new(fixed_start(), TimeDelta::microseconds(1_500))),
        Arc::new(SequentialTraceIds::default()),
    )
}

/// Application wired exactly like the server, with deterministic logging.
pub fn test_app(
    repository: Arc<dyn DbRepository>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    test_app_with(repository, deterministic_logging())
}

/// Same as [`test_app`] with a caller-supplied middleware.
pub fn test_app_with(
    repository: Arc<dyn DbRepository>,
    logging: RequestLogging,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(HttpState::new(repository)))
        .wrap(logging)
        .configure(configure)
}

/// One recorded log event with the fields of its enclosing spans merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// `tracing` layer that records events for assertions.
///
/// # Examples
/// ```
/// use userpost_api::test_support::LogCapture;
///
/// let capture = LogCapture::default();
/// let _guard = capture.install();
/// tracing::info!(answer = 42, "hello");
/// assert_eq!(capture.find("hello").and_then(|e| e.field("answer").map(str::to_owned)), Some("42".to_owned()));
/// ```
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Make this capture the thread's default subscriber until the guard drops.
    pub fn install(&self) -> DefaultGuard {
        tracing_subscriber::registry().with(self.clone()).set_default()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.lock_events().clone()
    }

    /// First event whose message equals `message`.
    pub fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.lock_events()
            .iter()
            .find(|event| event.message == message)
            .cloned()
    }

    fn lock_events(&self) -> MutexGuard<'_, Vec<CapturedEvent>> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("log capture mutex"),
        }
    }
}

struct SpanFields(BTreeMap<String, String>);

#[derive(Default)]
struct FieldVisitor(BTreeMap<String, String>);

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_owned(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_owned(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_owned(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}

impl<S> Layer<S> for LogCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(visitor.0));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(span_fields) = span.extensions().get::<SpanFields>() {
                    fields.extend(span_fields.0.clone());
                }
            }
        }
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let message = visitor.0.remove("message").unwrap_or_default();
        fields.extend(visitor.0);

        self.lock_events().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
        });
    }
}
