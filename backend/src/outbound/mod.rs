//! Outbound adapters implementing the storage port.
//!
//! - **persistence**: PostgreSQL through Diesel and a `bb8` pool.
//! - **memory**: deterministic in-process store with injectable behaviour,
//!   used when no database is configured and throughout the tests.

pub mod memory;
pub mod persistence;
