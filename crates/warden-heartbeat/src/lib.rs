//! # Warden Heartbeat
//!
//! Application-level freshness checking for supervised targets. A target
//! that is alive at the OS level can still be stuck; targets that opt in
//! write a timestamp to a shared store as they make forward progress, and
//! this crate decides whether that timestamp is recent enough.
//!
//! The store is consumed through the narrow [`HeartbeatStore`] read
//! interface; the shipped implementation speaks SQL through a pooled
//! connection per store locator.

pub mod probe;
pub mod sample;
pub mod sql;
pub mod store;

use std::time::Duration;
use thiserror::Error;

pub use probe::{HeartbeatProbe, HeartbeatVerdict, StoreHeartbeatProbe};
pub use sample::parse_heartbeat_value;
pub use sql::SqlHeartbeatStore;
pub use store::{HeartbeatSpec, HeartbeatStore, HeartbeatValue};

/// Heartbeat query error types.
#[derive(Error, Debug)]
pub enum HeartbeatError {
    #[error("heartbeat query failed: {0}")]
    Query(String),

    #[error("heartbeat query timed out after {0:?}")]
    Timeout(Duration),

    #[error("heartbeat store locator rejected: {locator} - {reason}")]
    Locator { locator: String, reason: String },
}

/// Result type for heartbeat store operations.
pub type HeartbeatResult<T> = Result<T, HeartbeatError>;
