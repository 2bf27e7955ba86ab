//! Health endpoint reporting whether the store is reachable.

use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, error, info};
use utoipa::ToSchema;

use crate::inbound::http::error::SERVICE_UNAVAILABLE;
use crate::inbound::http::state::HttpState;
use crate::middleware::RequestContext;

/// Health response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// `OK` or `service unavailable`.
    #[schema(example = "OK")]
    pub status: String,
}

/// Ping the store. 200 when it answers, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable", body = HealthStatus),
        (status = 503, description = "Store unreachable", body = HealthStatus)
    ),
    tags = ["health"],
    operation_id = "healthCheck"
)]
#[get("/health")]
pub async fn health_check(state: web::Data<HttpState>, ctx: RequestContext) -> HttpResponse {
    let span = ctx.handler_span("HealthCheck");
    async move {
        if let Some(stats) = state.repository.connection() {
            info!(open = stats.open, idle = stats.idle, "connection pool");
        }
        match ctx.run_store(state.repository.ping()).await {
            Ok(()) => HttpResponse::Ok().json(HealthStatus {
                status: "OK".to_owned(),
            }),
            Err(err) => {
                error!(error = %err, "health check failed");
                HttpResponse::ServiceUnavailable().json(HealthStatus {
                    status: SERVICE_UNAVAILABLE.to_owned(),
                })
            }
        }
    }
    .instrument(span)
    .await
}
