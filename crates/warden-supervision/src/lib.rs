//! # Warden Supervision
//!
//! The watchdog core: per-target health evaluation and restart decisions.
//!
//! Each tick the supervisor walks the configured targets in order and, for
//! each one outside its post-restart grace period, probes OS-level
//! liveness and (only when the process is responsive) heartbeat freshness,
//! then restarts targets with a negative verdict. Status transitions -
//! never steady states - drive log lines and notifications.

pub mod config;
pub mod evaluator;
pub mod liveness;
pub mod restart;
pub mod supervisor;
pub mod tracker;

pub use config::{TargetSpec, WatchdogConfig, WatchdogOptions};
pub use evaluator::{evaluate, Evaluation, RestartReason, Verdict};
pub use liveness::{Liveness, LivenessProbe, LivenessReport, SystemProbe};
pub use restart::{restart_target, RestartOutcome};
pub use supervisor::Supervisor;
pub use tracker::{HealthyOutcome, TargetStatus, TrackedState};
