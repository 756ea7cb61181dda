//! # Warden Common
//!
//! Shared types for the warden watchdog supervisor:
//! - Error types for process operations
//! - Domain newtypes
//! - Text normalization for the console/notification sinks

pub mod errors;
pub mod text;
pub mod types;

pub use errors::{ProcessError, ProcessResult};
pub use text::fold_ascii;
pub use types::TargetName;
