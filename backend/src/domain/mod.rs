//! Domain primitives and the storage port.
//!
//! Purpose: define the users/posts entities, their validated write payloads,
//! the transport-agnostic error type and the correlation identifier. Nothing
//! here knows about HTTP or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: failure categories mapped to HTTP by inbound adapters.
//! - User, NewUser, UserUpdate: user record and write payloads.
//! - Post, NewPost, PostUpdate: post record and write payloads.
//! - TraceId / TraceIdSource: per-request correlation identifier.
//! - ports::DbRepository: the persistence contract.

pub mod error;
pub mod ports;
pub mod post;
pub mod trace_id;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::post::{NewPost, Post, PostFields, PostUpdate, PostValidationError};
pub use self::trace_id::{RandomTraceIds, TRACE_ID_HEADER, TraceId, TraceIdSource};
pub use self::user::{NewUser, User, UserUpdate, UserValidationError};
