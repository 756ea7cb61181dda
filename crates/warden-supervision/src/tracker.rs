//! Per-target tracked state and transition bookkeeping.
//!
//! The tracker owns everything the supervisor remembers about a target
//! between ticks: the process handle, the status label, and the restart
//! timestamp that arms the grace period. Transitions - and only
//! transitions - produce log lines and notifications; re-evaluating into
//! the same status is silent.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::fmt;
use std::time::Duration;

use warden_process::ProcessHandle;

use crate::evaluator::RestartReason;

/// Status label for one supervised target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    /// Not yet evaluated since supervision started.
    Unknown,
    /// Alive and healthy.
    Running,
    /// Down, and the last relaunch attempt could not complete.
    Stopped,
    /// Hung, and the last relaunch attempt could not complete.
    NotResponding,
    /// A restart is warranted and in progress (or repeatedly failing) for
    /// this reason.
    Restarting(RestartReason),
    /// Relaunched; awaiting the first healthy evaluation.
    Restarted,
    /// More than one process currently matches the target's name.
    MultipleInstances,
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetStatus::Unknown => write!(f, "unknown"),
            TargetStatus::Running => write!(f, "running"),
            TargetStatus::Stopped => write!(f, "stopped"),
            TargetStatus::NotResponding => write!(f, "not_responding"),
            TargetStatus::Restarting(reason) => write!(f, "restarting_{}", reason.slug()),
            TargetStatus::Restarted => write!(f, "restarted"),
            TargetStatus::MultipleInstances => write!(f, "multiple_instances"),
        }
    }
}

/// What a healthy evaluation did to the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthyOutcome {
    /// Already running; nothing to report.
    Unchanged,
    /// First healthy sighting (from Unknown or MultipleInstances); worth a
    /// log line but not a notification.
    NowRunning,
    /// Healthy again after a restart cycle; triggers the "recovered"
    /// notification.
    Recovered,
}

/// Mutable per-target state, owned by the supervisor loop.
#[derive(Debug)]
pub struct TrackedState {
    handle: Option<ProcessHandle>,
    status: TargetStatus,
    last_restart_at: DateTime<Utc>,
}

impl TrackedState {
    /// New state at supervision start. `last_restart_at` is seeded with the
    /// start time so every target gets an initial grace period instead of
    /// being restarted while it is still coming up alongside the watchdog.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            handle: None,
            status: TargetStatus::Unknown,
            last_restart_at: started_at,
        }
    }

    pub fn status(&self) -> TargetStatus {
        self.status
    }

    pub fn last_restart_at(&self) -> DateTime<Utc> {
        self.last_restart_at
    }

    /// Hand the tracked handle to a probe; it comes back via
    /// [`TrackedState::store_handle`] or [`TrackedState::record_relaunched`].
    pub fn take_handle(&mut self) -> Option<ProcessHandle> {
        self.handle.take()
    }

    pub fn store_handle(&mut self, handle: Option<ProcessHandle>) {
        self.handle = handle;
    }

    /// Time left in the post-restart grace period, or `None` when outside
    /// it.
    pub fn grace_remaining(&self, now: DateTime<Utc>, grace: Duration) -> Option<ChronoDuration> {
        let elapsed = now - self.last_restart_at;
        let grace = ChronoDuration::milliseconds(grace.as_millis() as i64);
        if elapsed < grace {
            Some(grace - elapsed)
        } else {
            None
        }
    }

    /// Record a healthy evaluation.
    pub fn observe_healthy(&mut self) -> HealthyOutcome {
        let outcome = match self.status {
            TargetStatus::Running => HealthyOutcome::Unchanged,
            TargetStatus::Unknown | TargetStatus::MultipleInstances => HealthyOutcome::NowRunning,
            TargetStatus::Restarting(_)
            | TargetStatus::Restarted
            | TargetStatus::Stopped
            | TargetStatus::NotResponding => HealthyOutcome::Recovered,
        };
        self.status = TargetStatus::Running;
        outcome
    }

    /// Record that a restart is warranted. Returns true only the first time
    /// this exact reason is seen consecutively, so a relaunch that is in
    /// progress or repeatedly failing does not re-notify every tick.
    pub fn observe_restart_pending(&mut self, reason: RestartReason) -> bool {
        if self.status == TargetStatus::Restarting(reason) {
            return false;
        }
        self.status = TargetStatus::Restarting(reason);
        true
    }

    /// Record the informational multiple-instances sighting. Returns true
    /// once per contiguous episode.
    pub fn observe_multiple_instances(&mut self) -> bool {
        if self.status == TargetStatus::MultipleInstances {
            return false;
        }
        self.status = TargetStatus::MultipleInstances;
        true
    }

    /// Record a successful relaunch: store the new handle and re-arm the
    /// grace period.
    pub fn record_relaunched(&mut self, handle: ProcessHandle, now: DateTime<Utc>) {
        self.handle = Some(handle);
        self.status = TargetStatus::Restarted;
        self.last_restart_at = now;
    }

    /// Record a relaunch that could not complete. The status keeps saying
    /// why the target is down; the next tick retries naturally.
    pub fn record_relaunch_failed(&mut self, reason: RestartReason) {
        self.status = match reason {
            RestartReason::NotResponding => TargetStatus::NotResponding,
            RestartReason::NotRunning | RestartReason::HeartbeatLost => TargetStatus::Stopped,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TrackedState {
        TrackedState::new(Utc::now() - ChronoDuration::hours(1))
    }

    #[test]
    fn test_initial_grace_period_from_start_time() {
        let tracked = TrackedState::new(Utc::now());
        assert!(tracked
            .grace_remaining(Utc::now(), Duration::from_secs(120))
            .is_some());
    }

    #[test]
    fn test_grace_period_expires() {
        let tracked = state();
        assert!(tracked
            .grace_remaining(Utc::now(), Duration::from_secs(120))
            .is_none());
    }

    #[test]
    fn test_relaunch_rearms_grace_period() {
        let mut tracked = state();
        assert!(tracked
            .grace_remaining(Utc::now(), Duration::from_secs(120))
            .is_none());

        tracked.record_relaunched(ProcessHandle::attach(12345), Utc::now());
        let remaining = tracked
            .grace_remaining(Utc::now(), Duration::from_secs(120))
            .expect("grace period re-armed");
        assert!(remaining.num_seconds() <= 120);
        assert_eq!(tracked.status(), TargetStatus::Restarted);
    }

    #[test]
    fn test_restart_pending_dedupes_consecutive_identical_reasons() {
        let mut tracked = state();
        assert!(tracked.observe_restart_pending(RestartReason::NotRunning));
        assert!(!tracked.observe_restart_pending(RestartReason::NotRunning));
        assert!(!tracked.observe_restart_pending(RestartReason::NotRunning));

        // A different reason is a new transition.
        assert!(tracked.observe_restart_pending(RestartReason::HeartbeatLost));
        assert!(!tracked.observe_restart_pending(RestartReason::HeartbeatLost));
    }

    #[test]
    fn test_recovery_edge_fires_once() {
        let mut tracked = state();
        tracked.observe_restart_pending(RestartReason::NotRunning);
        tracked.record_relaunched(ProcessHandle::attach(12345), Utc::now());

        assert_eq!(tracked.observe_healthy(), HealthyOutcome::Recovered);
        assert_eq!(tracked.observe_healthy(), HealthyOutcome::Unchanged);
        assert_eq!(tracked.status(), TargetStatus::Running);
    }

    #[test]
    fn test_first_healthy_sighting_is_not_a_recovery() {
        let mut tracked = state();
        assert_eq!(tracked.observe_healthy(), HealthyOutcome::NowRunning);
        assert_eq!(tracked.observe_healthy(), HealthyOutcome::Unchanged);
    }

    #[test]
    fn test_multiple_instances_reported_once_per_episode() {
        let mut tracked = state();
        assert!(tracked.observe_multiple_instances());
        assert!(!tracked.observe_multiple_instances());

        // Episode ends, target is healthy again.
        assert_eq!(tracked.observe_healthy(), HealthyOutcome::NowRunning);

        // New episode reports again.
        assert!(tracked.observe_multiple_instances());
    }

    #[test]
    fn test_relaunch_failure_labels() {
        let mut tracked = state();
        tracked.record_relaunch_failed(RestartReason::NotRunning);
        assert_eq!(tracked.status(), TargetStatus::Stopped);

        tracked.record_relaunch_failed(RestartReason::NotResponding);
        assert_eq!(tracked.status(), TargetStatus::NotResponding);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TargetStatus::Running.to_string(), "running");
        assert_eq!(
            TargetStatus::Restarting(RestartReason::HeartbeatLost).to_string(),
            "restarting_heartbeat_lost"
        );
        assert_eq!(TargetStatus::MultipleInstances.to_string(), "multiple_instances");
    }
}
