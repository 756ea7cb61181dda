//! The restart action: terminate what is there, relaunch from the
//! configured path.
//!
//! Termination failures never block the relaunch - the OS will reap
//! eventually, or the next tick retries. A missing launch path aborts the
//! relaunch as a configuration error instead of spinning in a retry loop
//! within the tick.

use chrono::Utc;
use std::time::Duration;
use tracing::{error, info, warn};

use warden_process::{spawn_program, validate_launch_path, ProcessHandle};

use crate::config::TargetSpec;
use crate::evaluator::RestartReason;
use crate::tracker::TrackedState;

/// Bounded wait for a terminated process to leave the process table.
const TERMINATION_WAIT: Duration = Duration::from_secs(5);

/// How one restart attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// New process launched; grace period re-armed.
    Relaunched,
    /// Launch path does not exist - configuration error, nothing spawned.
    LaunchPathMissing,
    /// Spawn was attempted and failed; the target stays absent and the
    /// next tick retries.
    SpawnFailed,
}

/// Terminate `current` (when present and alive) and relaunch the target.
/// Updates `tracked` with the outcome; the caller only logs.
pub async fn restart_target(
    target: &TargetSpec,
    tracked: &mut TrackedState,
    current: Option<ProcessHandle>,
    reason: RestartReason,
    settle_delay: Duration,
) -> RestartOutcome {
    if let Some(mut handle) = current {
        if handle.is_alive() {
            let pid = handle.pid();
            if let Err(e) = handle.terminate() {
                warn!(target = %target.name, pid, "termination request failed: {}", e);
            }
            if handle.wait_exit(TERMINATION_WAIT).await {
                info!(target = %target.name, pid, "process terminated");
            } else {
                warn!(target = %target.name, pid, "process did not exit in time, force-killing");
                if let Err(e) = handle.kill() {
                    warn!(target = %target.name, pid, "force kill failed: {}", e);
                }
                let _ = handle.wait_exit(Duration::from_secs(1)).await;
            }
        }
        // Handle dropped here; nothing retains the old process.
    }

    if let Err(e) = validate_launch_path(&target.launch_path) {
        error!(target = %target.name, "cannot relaunch: {}", e);
        tracked.record_relaunch_failed(reason);
        return RestartOutcome::LaunchPathMissing;
    }

    match spawn_program(&target.launch_path) {
        Ok(child) => {
            let pid = child.id();
            tracked.record_relaunched(ProcessHandle::from(child), Utc::now());
            info!(target = %target.name, pid, "relaunched");
            if !settle_delay.is_zero() {
                tokio::time::sleep(settle_delay).await;
            }
            RestartOutcome::Relaunched
        }
        Err(e) => {
            error!(target = %target.name, "relaunch failed: {}", e);
            tracked.record_relaunch_failed(reason);
            RestartOutcome::SpawnFailed
        }
    }
}
