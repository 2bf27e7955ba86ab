//! Shared validation helpers for inbound HTTP adapters.
//!
//! Malformed path ids are a 400; bodies that do not decode or fail field
//! validation are a 422. Both are logged at info and never reach storage.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::domain::Error;

pub(crate) const INVALID_ID: &str = "invalid id";
pub(crate) const BAD_ENTITY: &str = "bad entity";

/// Parse a decimal `u64` path segment. Signs, whitespace and overflow are rejected.
pub(crate) fn parse_id(raw: &str) -> Result<u64, Error> {
    let parsed = if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        raw.parse::<u64>().ok()
    } else {
        None
    };
    parsed.ok_or_else(|| {
        info!(id = raw, "{INVALID_ID}");
        Error::invalid_request(INVALID_ID)
    })
}

/// Decode a JSON body into `T`.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(bad_entity)
}

/// A body that decoded but failed domain validation.
pub(crate) fn bad_entity(err: impl Display) -> Error {
    info!(error = %err, "request body rejected");
    Error::unprocessable_entity(BAD_ENTITY)
}
