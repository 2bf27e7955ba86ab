//! HTTP adapter mapping for domain and storage errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while giving every
//! handler the same `{"error": "..."}` body and status mapping.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::domain::ports::RepositoryError;
use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Message returned whenever the store cannot serve a request.
pub const SERVICE_UNAVAILABLE: &str = "service unavailable";
const INTERNAL_ERROR: &str = "internal server error";

/// Error response body.
///
/// ```json
/// {"error":"user not found"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Stable, human-readable failure message.
    #[schema(example = "user not found")]
    pub error: String,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn client_message(error: &Error) -> &str {
    if matches!(error.code(), ErrorCode::InternalError) {
        INTERNAL_ERROR
    } else {
        error.message()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: client_message(self).to_owned(),
        })
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(INTERNAL_ERROR)
    }
}

/// Client-facing messages for the storage outcomes of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StoreMessages {
    pub not_found: &'static str,
    pub conflict: &'static str,
}

/// Messages for user create, read and delete.
pub(crate) const USERS: StoreMessages = StoreMessages {
    not_found: "user not found",
    conflict: "user already exists",
};

/// On update a uniqueness failure can only be the email.
pub(crate) const USER_UPDATE: StoreMessages = StoreMessages {
    not_found: "user not found",
    conflict: "email already in use",
};

pub(crate) const POSTS: StoreMessages = StoreMessages {
    not_found: "post not found",
    conflict: "userID doesn't exist",
};

/// Classify a storage failure by variant.
///
/// `Unavailable` is logged at error level; the other variants are expected
/// outcomes and are logged at info.
pub(crate) fn map_store_error(err: RepositoryError, messages: StoreMessages) -> Error {
    match err {
        RepositoryError::NotFound { message } => {
            info!(detail = %message, "{}", messages.not_found);
            Error::not_found(messages.not_found)
        }
        RepositoryError::ConstraintViolation { message } => {
            info!(detail = %message, "{}", messages.conflict);
            Error::conflict(messages.conflict)
        }
        RepositoryError::Unavailable { message } => {
            error!(detail = %message, "storage unavailable");
            Error::service_unavailable(SERVICE_UNAVAILABLE)
        }
    }
}
