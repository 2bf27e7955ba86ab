//! Inbound adapters translating external requests into storage calls.

pub mod http;
