//! Health evaluation: one verdict per target per tick.
//!
//! Decision order, first match wins:
//! 1. Inside the post-restart grace period: skip, no probes invoked.
//! 2. Absent: restart ("not running").
//! 3. Unresponsive: restart ("not responding"). Checked before the
//!    heartbeat - a hung process is a stronger and cheaper signal than a
//!    stale application heartbeat, and short-circuiting keeps the
//!    network-bound heartbeat query off the common failure path.
//! 4. Responsive but heartbeat stale: restart ("heartbeat lost").
//! 5. Otherwise healthy.

use chrono::Utc;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use warden_heartbeat::HeartbeatProbe;

use crate::config::TargetSpec;
use crate::liveness::{Liveness, LivenessProbe, LivenessReport};
use crate::tracker::TrackedState;

/// Why a restart is warranted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    NotRunning,
    NotResponding,
    HeartbeatLost,
}

impl RestartReason {
    /// Label fragment for status strings.
    pub fn slug(self) -> &'static str {
        match self {
            RestartReason::NotRunning => "not_running",
            RestartReason::NotResponding => "not_responding",
            RestartReason::HeartbeatLost => "heartbeat_lost",
        }
    }
}

impl fmt::Display for RestartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartReason::NotRunning => write!(f, "not running"),
            RestartReason::NotResponding => write!(f, "not responding"),
            RestartReason::HeartbeatLost => write!(f, "heartbeat lost"),
        }
    }
}

/// The evaluator's output for one target on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Healthy,
    Restart(RestartReason),
}

/// One evaluation pass result.
#[derive(Debug)]
pub enum Evaluation {
    /// Inside the grace period; nothing was probed.
    Skipped { remaining_secs: i64 },
    /// Probes ran and produced a verdict.
    Checked {
        verdict: Verdict,
        report: LivenessReport,
    },
}

/// Evaluate one target. Probes are only invoked outside the grace period,
/// and the heartbeat probe only when liveness already passed.
pub async fn evaluate(
    target: &TargetSpec,
    tracked: &mut TrackedState,
    liveness: &mut dyn LivenessProbe,
    heartbeat: &dyn HeartbeatProbe,
    grace_period: Duration,
) -> Evaluation {
    if let Some(remaining) = tracked.grace_remaining(Utc::now(), grace_period) {
        debug!(
            target = %target.name,
            remaining_secs = remaining.num_seconds(),
            "within post-restart grace period, skipping evaluation"
        );
        return Evaluation::Skipped {
            remaining_secs: remaining.num_seconds(),
        };
    }

    let report = liveness.probe(target, tracked.take_handle());

    let verdict = match report.liveness {
        Liveness::Absent => Verdict::Restart(RestartReason::NotRunning),
        Liveness::Unresponsive => Verdict::Restart(RestartReason::NotResponding),
        Liveness::Responsive => {
            let beat = heartbeat
                .check(target.name.as_str(), target.heartbeat.as_ref())
                .await;
            if beat.is_stale() {
                Verdict::Restart(RestartReason::HeartbeatLost)
            } else {
                Verdict::Healthy
            }
        }
    };

    Evaluation::Checked { verdict, report }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use warden_common::TargetName;
    use warden_heartbeat::{HeartbeatSpec, HeartbeatVerdict};
    use warden_process::ProcessHandle;

    pub(crate) fn target() -> TargetSpec {
        TargetSpec {
            name: TargetName::from("till"),
            launch_path: "/opt/till/till".to_string(),
            window_title: None,
            category: None,
            heartbeat: None,
        }
    }

    pub(crate) fn target_with_heartbeat() -> TargetSpec {
        TargetSpec {
            heartbeat: Some(HeartbeatSpec {
                locator: "sqlite://unused".to_string(),
                table: "beats".to_string(),
                filter: None,
                field: "seen_at".to_string(),
                staleness_minutes: 5,
            }),
            ..target()
        }
    }

    /// Scripted liveness probe counting invocations.
    pub(crate) struct ScriptedLiveness {
        pub liveness: Liveness,
        pub instances: usize,
        pub calls: usize,
    }

    impl ScriptedLiveness {
        pub(crate) fn new(liveness: Liveness) -> Self {
            Self {
                liveness,
                instances: match liveness {
                    Liveness::Absent => 0,
                    _ => 1,
                },
                calls: 0,
            }
        }
    }

    impl LivenessProbe for ScriptedLiveness {
        fn probe(&mut self, _target: &TargetSpec, _tracked: Option<ProcessHandle>) -> LivenessReport {
            self.calls += 1;
            LivenessReport {
                liveness: self.liveness,
                handle: match self.liveness {
                    Liveness::Absent => None,
                    _ => Some(ProcessHandle::attach(4242)),
                },
                instances: self.instances,
            }
        }
    }

    /// Scripted heartbeat probe counting invocations.
    pub(crate) struct ScriptedHeartbeat {
        pub verdict: HeartbeatVerdict,
        pub calls: Arc<AtomicUsize>,
    }

    impl ScriptedHeartbeat {
        pub(crate) fn new(verdict: HeartbeatVerdict) -> Self {
            Self {
                verdict,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HeartbeatProbe for ScriptedHeartbeat {
        async fn check(&self, _target: &str, _spec: Option<&HeartbeatSpec>) -> HeartbeatVerdict {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict
        }
    }

    /// Tracked state with the initial grace period already behind it.
    pub(crate) fn settled_state() -> TrackedState {
        TrackedState::new(Utc::now() - ChronoDuration::hours(1))
    }

    const GRACE: Duration = Duration::from_secs(120);

    #[tokio::test]
    async fn test_absent_target_restarts_with_not_running() {
        let mut liveness = ScriptedLiveness::new(Liveness::Absent);
        let heartbeat = ScriptedHeartbeat::new(HeartbeatVerdict::Fresh);
        let mut tracked = settled_state();

        let evaluation =
            evaluate(&target(), &mut tracked, &mut liveness, &heartbeat, GRACE).await;

        match evaluation {
            Evaluation::Checked { verdict, .. } => {
                assert_eq!(verdict, Verdict::Restart(RestartReason::NotRunning));
            }
            _ => panic!("expected a checked evaluation"),
        }
        // The heartbeat is never consulted for an absent process.
        assert_eq!(heartbeat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unresponsive_short_circuits_heartbeat() {
        let mut liveness = ScriptedLiveness::new(Liveness::Unresponsive);
        let heartbeat = ScriptedHeartbeat::new(HeartbeatVerdict::Stale);
        let mut tracked = settled_state();

        let evaluation = evaluate(
            &target_with_heartbeat(),
            &mut tracked,
            &mut liveness,
            &heartbeat,
            GRACE,
        )
        .await;

        match evaluation {
            Evaluation::Checked { verdict, .. } => {
                assert_eq!(verdict, Verdict::Restart(RestartReason::NotResponding));
            }
            _ => panic!("expected a checked evaluation"),
        }
        assert_eq!(heartbeat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_responsive_with_stale_heartbeat_restarts() {
        let mut liveness = ScriptedLiveness::new(Liveness::Responsive);
        let heartbeat = ScriptedHeartbeat::new(HeartbeatVerdict::Stale);
        let mut tracked = settled_state();

        let evaluation = evaluate(
            &target_with_heartbeat(),
            &mut tracked,
            &mut liveness,
            &heartbeat,
            GRACE,
        )
        .await;

        match evaluation {
            Evaluation::Checked { verdict, .. } => {
                assert_eq!(verdict, Verdict::Restart(RestartReason::HeartbeatLost));
            }
            _ => panic!("expected a checked evaluation"),
        }
        assert_eq!(heartbeat.call_count(), 1);
    }

    #[tokio::test]
    async fn test_responsive_with_fresh_heartbeat_is_healthy() {
        let mut liveness = ScriptedLiveness::new(Liveness::Responsive);
        let heartbeat = ScriptedHeartbeat::new(HeartbeatVerdict::Fresh);
        let mut tracked = settled_state();

        let evaluation = evaluate(
            &target_with_heartbeat(),
            &mut tracked,
            &mut liveness,
            &heartbeat,
            GRACE,
        )
        .await;

        match evaluation {
            Evaluation::Checked { verdict, .. } => assert_eq!(verdict, Verdict::Healthy),
            _ => panic!("expected a checked evaluation"),
        }
    }

    #[tokio::test]
    async fn test_assumed_fresh_heartbeat_is_healthy() {
        // Store unreachable: the fail-open verdict must not trigger a
        // restart.
        let mut liveness = ScriptedLiveness::new(Liveness::Responsive);
        let heartbeat = ScriptedHeartbeat::new(HeartbeatVerdict::AssumedFresh);
        let mut tracked = settled_state();

        let evaluation = evaluate(
            &target_with_heartbeat(),
            &mut tracked,
            &mut liveness,
            &heartbeat,
            GRACE,
        )
        .await;

        match evaluation {
            Evaluation::Checked { verdict, .. } => assert_eq!(verdict, Verdict::Healthy),
            _ => panic!("expected a checked evaluation"),
        }
    }

    #[tokio::test]
    async fn test_grace_period_skips_all_probes() {
        let mut liveness = ScriptedLiveness::new(Liveness::Absent);
        let heartbeat = ScriptedHeartbeat::new(HeartbeatVerdict::Stale);
        // Fresh state: the initial grace period is active.
        let mut tracked = TrackedState::new(Utc::now());

        let evaluation = evaluate(
            &target_with_heartbeat(),
            &mut tracked,
            &mut liveness,
            &heartbeat,
            GRACE,
        )
        .await;

        assert!(matches!(evaluation, Evaluation::Skipped { .. }));
        assert_eq!(liveness.calls, 0);
        assert_eq!(heartbeat.call_count(), 0);
    }
}
