//! OS-level liveness probing.
//!
//! Two strategies, selected per target by configuration: name-based
//! process-table matching and exact-window-title lookup. Both normalize
//! the inherently racy OS view into a tri-state plus an optional canonical
//! handle; a process exiting between enumeration and inspection degrades
//! to `Absent`, never to an error.

use sysinfo::System;
use tracing::debug;

use warden_process::{
    is_responding, pids_matching_name, process_exists, refresh_process_table, window_owner_pid,
    ProcessHandle,
};

use crate::config::TargetSpec;

/// Tri-state liveness result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// No process found for this target.
    Absent,
    /// Process found and responding (or the responsiveness check does not
    /// apply to it).
    Responsive,
    /// Process found but hung.
    Unresponsive,
}

/// One probe result: the tri-state, the canonical handle when a process
/// was found, and how many simultaneous matches the name strategy saw.
#[derive(Debug)]
pub struct LivenessReport {
    pub liveness: Liveness,
    pub handle: Option<ProcessHandle>,
    pub instances: usize,
}

impl LivenessReport {
    fn absent() -> Self {
        Self {
            liveness: Liveness::Absent,
            handle: None,
            instances: 0,
        }
    }
}

/// Liveness probing capability. The previously tracked handle is passed in
/// by value: the probe either folds it into its result (handle reuse keeps
/// a spawned child's ownership intact) or drops it as dead.
pub trait LivenessProbe: Send {
    fn probe(&mut self, target: &TargetSpec, tracked: Option<ProcessHandle>) -> LivenessReport;
}

/// Production probe backed by the OS process table. One process-table
/// snapshot is kept across ticks and refreshed per probe call.
pub struct SystemProbe {
    sys: System,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }

    fn probe_by_name(&mut self, target: &TargetSpec, tracked: Option<ProcessHandle>) -> LivenessReport {
        // Reap a spawned child that already exited so it does not linger as
        // a zombie and match its own name in the table below.
        let mut tracked = match tracked {
            Some(mut handle) => {
                if handle.is_alive() {
                    Some(handle)
                } else {
                    None
                }
            }
            None => None,
        };

        refresh_process_table(&mut self.sys);
        let pids = pids_matching_name(&self.sys, &target.executable_name());
        let instances = pids.len();

        // First match still alive at inspection time becomes canonical;
        // anything that exited mid-check is skipped.
        let canonical = pids
            .iter()
            .copied()
            .find(|&pid| process_exists(pid).unwrap_or(false));

        let Some(pid) = canonical else {
            debug!(target = %target.name, "no process matches executable name");
            return LivenessReport {
                instances,
                ..LivenessReport::absent()
            };
        };

        let handle = match tracked.take() {
            Some(handle) if handle.pid() == pid => handle,
            _ => ProcessHandle::attach(pid),
        };

        self.report_for(handle, instances)
    }

    fn probe_by_window(
        &mut self,
        target: &TargetSpec,
        title: &str,
        tracked: Option<ProcessHandle>,
    ) -> LivenessReport {
        refresh_process_table(&mut self.sys);

        if let Some(pid) = window_owner_pid(title) {
            if !process_exists(pid).unwrap_or(false) {
                // Window resolved but its owner vanished mid-check.
                return LivenessReport::absent();
            }
            let handle = match tracked {
                Some(handle) if handle.pid() == pid => handle,
                _ => ProcessHandle::attach(pid),
            };
            return self.report_for(handle, 1);
        }

        // No window yet - common right after a relaunch, before the target
        // maps its title. Fall back to the tracked process if it still
        // runs.
        if let Some(mut handle) = tracked {
            if handle.is_alive() {
                debug!(target = %target.name, "window not found, using tracked process");
                return self.report_for(handle, 1);
            }
        }

        debug!(target = %target.name, "window not found and no tracked process");
        LivenessReport::absent()
    }

    fn report_for(&self, handle: ProcessHandle, instances: usize) -> LivenessReport {
        let liveness = match is_responding(&self.sys, handle.pid()) {
            Some(false) => Liveness::Unresponsive,
            // Responding, or the check does not apply (no GUI window).
            Some(true) | None => Liveness::Responsive,
        };
        LivenessReport {
            liveness,
            handle: Some(handle),
            instances,
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessProbe for SystemProbe {
    fn probe(&mut self, target: &TargetSpec, tracked: Option<ProcessHandle>) -> LivenessReport {
        match target.window_title.as_deref() {
            Some(title) => self.probe_by_window(target, title, tracked),
            None => self.probe_by_name(target, tracked),
        }
    }
}
