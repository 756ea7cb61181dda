//! Error types for process operations.
//!
//! Every OS-level process call the watchdog makes can race with the target
//! exiting on its own. These errors describe the failures that are worth
//! reporting; callers are expected to log them and keep the supervision
//! loop running rather than propagate them upward.

use thiserror::Error;

/// Errors raised by the process control layer.
#[derive(Error, Debug, Clone)]
pub enum ProcessError {
    #[error("process not found: {id}")]
    NotFound { id: String },

    #[error("spawn failed: {id} - {reason}")]
    SpawnFailed { id: String, reason: String },

    #[error("termination failed: {id} - {reason}")]
    StopFailed { id: String, reason: String },

    #[error("timed out: {id} - {operation}")]
    Timeout { id: String, operation: String },

    #[error("configuration error: {id} - {reason}")]
    Configuration { id: String, reason: String },
}

impl ProcessError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn spawn_failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn stop_failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StopFailed {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout(id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Timeout {
            id: id.into(),
            operation: operation.into(),
        }
    }

    pub fn configuration(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for process operations.
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;
