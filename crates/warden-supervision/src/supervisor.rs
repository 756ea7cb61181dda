//! The supervision loop.
//!
//! One sequential pass over all targets per tick, in configured order,
//! with a fixed sleep between passes. Tracked state lives here and only
//! here; probes and the restart controller borrow it per target. A
//! shutdown request is honored between ticks so no target is ever left
//! killed but not relaunched.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use warden_common::{fold_ascii, TargetName};
use warden_heartbeat::HeartbeatProbe;
use warden_notify::NotificationRouter;

use crate::config::{TargetSpec, WatchdogConfig, WatchdogOptions};
use crate::evaluator::{evaluate, Evaluation, Verdict};
use crate::liveness::LivenessProbe;
use crate::restart::restart_target;
use crate::tracker::{HealthyOutcome, TrackedState};

pub struct Supervisor {
    options: WatchdogOptions,
    targets: Vec<TargetSpec>,
    states: HashMap<TargetName, TrackedState>,
    liveness: Box<dyn LivenessProbe>,
    heartbeat: Arc<dyn HeartbeatProbe>,
    notifier: NotificationRouter,
    started_at: DateTime<Utc>,
}

impl Supervisor {
    pub fn new(
        config: WatchdogConfig,
        liveness: Box<dyn LivenessProbe>,
        heartbeat: Arc<dyn HeartbeatProbe>,
        notifier: NotificationRouter,
    ) -> Self {
        let started_at = Utc::now();
        let states = config
            .targets
            .iter()
            .map(|t| (t.name.clone(), TrackedState::new(started_at)))
            .collect();

        Self {
            options: config.watchdog,
            targets: config.targets,
            states,
            liveness,
            heartbeat,
            notifier,
            started_at,
        }
    }

    /// Run until `shutdown` fires. The cancellation is observed between
    /// ticks, so an in-flight pass always completes.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!(
            targets = self.targets.len(),
            interval_secs = self.options.tick_interval.as_secs(),
            "supervision started"
        );
        self.announce(&format!(
            "Watchdog started{}, supervising {} program(s)",
            self.site_suffix(),
            self.targets.len()
        ))
        .await;

        let mut ticker = tokio::time::interval(self.options.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately; that is the
        // initial pass.
        loop {
            tokio::select! {
                _ = ticker.tick() => self.run_tick().await,
                _ = shutdown.cancelled() => {
                    info!("shutdown requested, stopping supervision");
                    break;
                }
            }
        }
    }

    /// One sequential pass over all targets.
    pub async fn run_tick(&mut self) {
        debug!("tick at {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
        // Iterate by index: each target's evaluation borrows pieces of self
        // and must not be entangled with the list iteration itself.
        for i in 0..self.targets.len() {
            let target = self.targets[i].clone();
            self.supervise_one(&target).await;
        }
    }

    /// Evaluate and, when warranted, restart a single target. Nothing in
    /// here propagates an error: every failure is logged and leaves state
    /// from which the next tick recovers.
    async fn supervise_one(&mut self, target: &TargetSpec) {
        let site_prefix = self.site_suffix_leading();
        let state = self
            .states
            .entry(target.name.clone())
            .or_insert_with(|| TrackedState::new(self.started_at));

        let evaluation = evaluate(
            target,
            state,
            self.liveness.as_mut(),
            self.heartbeat.as_ref(),
            self.options.grace_period,
        )
        .await;

        let (verdict, mut report) = match evaluation {
            Evaluation::Skipped { .. } => return,
            Evaluation::Checked { verdict, report } => (verdict, report),
        };

        match verdict {
            Verdict::Healthy => {
                state.store_handle(report.handle.take());
                if report.instances > 1 {
                    // Informational only; the label holds for the whole
                    // episode so the sighting is reported once.
                    if state.observe_multiple_instances() {
                        info!(
                            target = %target.name,
                            instances = report.instances,
                            "multiple instances found"
                        );
                    }
                    return;
                }
                match state.observe_healthy() {
                    HealthyOutcome::Unchanged => {}
                    HealthyOutcome::NowRunning => {
                        info!(target = %target.name, "running");
                    }
                    HealthyOutcome::Recovered => {
                        info!(target = %target.name, "running again");
                        let message =
                            format!("{}{} is running again", site_prefix, describe(target));
                        self.notifier.broadcast(&fold_ascii(&message)).await;
                    }
                }
            }
            Verdict::Restart(reason) => {
                if report.instances > 1 {
                    // Not a transition here: the restarting label below
                    // must stick so its own dedup keeps working.
                    debug!(
                        target = %target.name,
                        instances = report.instances,
                        "multiple instances found"
                    );
                }
                if state.observe_restart_pending(reason) {
                    warn!(target = %target.name, "{}, restarting", reason);
                    let message = format!(
                        "{}{} {}, restarting",
                        site_prefix,
                        describe(target),
                        reason
                    );
                    self.notifier.broadcast(&fold_ascii(&message)).await;
                }

                // A successful relaunch re-arms the grace period, keeping
                // the next ticks silent while the target comes up.
                let outcome = restart_target(
                    target,
                    state,
                    report.handle.take(),
                    reason,
                    self.options.settle_delay,
                )
                .await;
                debug!(target = %target.name, ?outcome, "restart attempt finished");
            }
        }
    }

    async fn announce(&self, message: &str) {
        self.notifier.broadcast(&fold_ascii(message)).await;
    }

    fn site_suffix(&self) -> String {
        match self.options.site.as_deref() {
            Some(site) => format!(" at {}", site),
            None => String::new(),
        }
    }

    fn site_suffix_leading(&self) -> String {
        match self.options.site.as_deref() {
            Some(site) => format!("[{}] ", site),
            None => String::new(),
        }
    }
}

/// "category/name" when a category is configured, plain name otherwise.
fn describe(target: &TargetSpec) -> String {
    match target.category.as_deref() {
        Some(category) => format!("{}/{}", category, target.name),
        None => target.name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::tests::{ScriptedHeartbeat, ScriptedLiveness};
    use crate::liveness::Liveness;
    use crate::tracker::TargetStatus;
    use warden_heartbeat::HeartbeatVerdict;

    fn config(yaml_targets: &str) -> WatchdogConfig {
        WatchdogConfig::load_from_string(&format!(
            "watchdog:\n  settle_delay: 0s\n  grace_period: 0s\ntargets:\n{}",
            yaml_targets
        ))
        .unwrap()
    }

    fn supervisor(liveness: Liveness, heartbeat: HeartbeatVerdict, yaml_targets: &str) -> Supervisor {
        Supervisor::new(
            config(yaml_targets),
            Box::new(ScriptedLiveness::new(liveness)),
            Arc::new(ScriptedHeartbeat::new(heartbeat)),
            NotificationRouter::from_config(None),
        )
    }

    #[tokio::test]
    async fn test_absent_target_ends_tick_in_restart_cycle() {
        // Launch path is missing, so the relaunch aborts and the status
        // records the target as stopped.
        let mut supervisor = supervisor(
            Liveness::Absent,
            HeartbeatVerdict::Fresh,
            "  - name: ghost\n    launch_path: /no/such/binary\n",
        );
        supervisor.run_tick().await;

        let state = supervisor.states.get(&TargetName::from("ghost")).unwrap();
        assert_eq!(state.status(), TargetStatus::Stopped);
    }

    #[tokio::test]
    async fn test_healthy_target_is_running_and_stays_silent() {
        let mut supervisor = supervisor(
            Liveness::Responsive,
            HeartbeatVerdict::Fresh,
            "  - name: till\n    launch_path: /opt/till/till\n",
        );
        supervisor.run_tick().await;
        let state = supervisor.states.get(&TargetName::from("till")).unwrap();
        assert_eq!(state.status(), TargetStatus::Running);

        // Second identical tick: no transition.
        supervisor.run_tick().await;
        let state = supervisor.states.get(&TargetName::from("till")).unwrap();
        assert_eq!(state.status(), TargetStatus::Running);
    }

    #[tokio::test]
    async fn test_multiple_instances_hold_their_label_across_ticks() {
        let mut liveness = ScriptedLiveness::new(Liveness::Responsive);
        liveness.instances = 2;
        let mut supervisor = Supervisor::new(
            config("  - name: till\n    launch_path: /opt/till/till\n"),
            Box::new(liveness),
            Arc::new(ScriptedHeartbeat::new(HeartbeatVerdict::Fresh)),
            NotificationRouter::from_config(None),
        );

        supervisor.run_tick().await;
        let state = supervisor.states.get(&TargetName::from("till")).unwrap();
        assert_eq!(state.status(), TargetStatus::MultipleInstances);

        // The episode persists; the label must not oscillate.
        supervisor.run_tick().await;
        let state = supervisor.states.get(&TargetName::from("till")).unwrap();
        assert_eq!(state.status(), TargetStatus::MultipleInstances);
    }

    #[tokio::test]
    async fn test_one_failing_target_does_not_skip_the_next() {
        let mut supervisor = supervisor(
            Liveness::Absent,
            HeartbeatVerdict::Fresh,
            concat!(
                "  - name: ghost\n    launch_path: /no/such/binary\n",
                "  - name: second-ghost\n    launch_path: /no/such/binary/either\n",
            ),
        );
        supervisor.run_tick().await;

        // Both targets were evaluated despite the first one's failed
        // relaunch.
        assert_eq!(
            supervisor
                .states
                .get(&TargetName::from("ghost"))
                .unwrap()
                .status(),
            TargetStatus::Stopped
        );
        assert_eq!(
            supervisor
                .states
                .get(&TargetName::from("second-ghost"))
                .unwrap()
                .status(),
            TargetStatus::Stopped
        );
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_restart_then_grace_keeps_following_ticks_silent() {
        use chrono::{Duration as ChronoDuration, Utc};
        use crate::tracker::TrackedState;

        // Absent target with a real launchable path and a long grace
        // period. The initial grace period is forced to be over so the
        // first tick evaluates.
        let mut supervisor = Supervisor::new(
            WatchdogConfig::load_from_string(concat!(
                "watchdog:\n",
                "  settle_delay: 0s\n",
                "  grace_period: 2m\n",
                "targets:\n",
                "  - name: sleeper\n",
                "    launch_path: /bin/sleep\n",
            ))
            .unwrap(),
            Box::new(ScriptedLiveness::new(Liveness::Absent)),
            Arc::new(ScriptedHeartbeat::new(HeartbeatVerdict::Fresh)),
            NotificationRouter::from_config(None),
        );
        let name = TargetName::from("sleeper");
        supervisor.states.insert(
            name.clone(),
            TrackedState::new(Utc::now() - ChronoDuration::hours(1)),
        );

        // Tick 1: absent, outside grace -> relaunch succeeds.
        supervisor.run_tick().await;
        assert_eq!(
            supervisor.states.get(&name).unwrap().status(),
            TargetStatus::Restarted
        );

        // Tick 2: inside the re-armed grace period -> no evaluation, the
        // status does not move even though the probe still says absent.
        supervisor.run_tick().await;
        assert_eq!(
            supervisor.states.get(&name).unwrap().status(),
            TargetStatus::Restarted
        );

        // Reap the relaunched child.
        if let Some(mut handle) = supervisor.states.get_mut(&name).unwrap().take_handle() {
            let _ = handle.kill();
            let _ = handle.wait_exit(std::time::Duration::from_secs(2)).await;
        }
    }

    #[tokio::test]
    async fn test_shutdown_between_ticks() {
        let mut supervisor = supervisor(
            Liveness::Responsive,
            HeartbeatVerdict::Fresh,
            "  - name: till\n    launch_path: /opt/till/till\n",
        );
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        // Already-cancelled token: run() must return promptly (after at
        // most the initial pass).
        tokio::time::timeout(std::time::Duration::from_secs(5), supervisor.run(shutdown))
            .await
            .expect("run() returned after cancellation");
    }
}
