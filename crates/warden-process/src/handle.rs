//! Owned reference to a live target process.
//!
//! Two provenances: a child we spawned ourselves (we own the OS child
//! handle and must reap it) and a process discovered in the process table
//! (we only know its PID). Either way the handle is the single place a
//! target's process identity lives between ticks, and dropping it releases
//! whatever the OS gave us - there is no separate close step to forget.

use std::fmt;
use std::process::Child;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::check::process_exists;
use crate::terminate::{force_kill, terminate_gracefully};
use warden_common::ProcessResult;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub enum ProcessHandle {
    /// A child this supervisor spawned. Holding the `Child` keeps the OS
    /// handle open so the PID cannot be recycled under us, and lets
    /// `try_wait` reap the exit status.
    Spawned(Child),
    /// A process found by enumeration or window lookup.
    Attached { pid: u32 },
}

impl ProcessHandle {
    pub fn attach(pid: u32) -> Self {
        Self::Attached { pid }
    }

    pub fn pid(&self) -> u32 {
        match self {
            Self::Spawned(child) => child.id(),
            Self::Attached { pid } => *pid,
        }
    }

    /// Whether the process is still alive. For spawned children this also
    /// reaps the exit status, so a child that died does not linger as a
    /// zombie in our process table.
    pub fn is_alive(&mut self) -> bool {
        match self {
            Self::Spawned(child) => matches!(child.try_wait(), Ok(None)),
            Self::Attached { pid } => process_exists(*pid).unwrap_or(false),
        }
    }

    /// Request graceful termination. "Already exited" surfaces as an error
    /// from the underlying signal/window call; callers log and move on.
    pub fn terminate(&mut self) -> ProcessResult<()> {
        terminate_gracefully(self.pid())
    }

    /// Force-kill without ceremony.
    pub fn kill(&mut self) -> ProcessResult<()> {
        match self {
            Self::Spawned(child) => {
                let pid = child.id();
                child
                    .kill()
                    .map_err(|e| warden_common::ProcessError::stop_failed(pid.to_string(), e.to_string()))
            }
            Self::Attached { pid } => force_kill(*pid),
        }
    }

    /// Poll until the process exits or `timeout` elapses. Returns true when
    /// the process is gone.
    pub async fn wait_exit(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.is_alive() {
                return true;
            }
            if Instant::now() >= deadline {
                debug!(pid = self.pid(), "process still alive after {:?}", timeout);
                return false;
            }
            tokio::time::sleep(EXIT_POLL_INTERVAL).await;
        }
    }
}

impl From<Child> for ProcessHandle {
    fn from(child: Child) -> Self {
        Self::Spawned(child)
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawned(child) => write!(f, "ProcessHandle::Spawned({})", child.id()),
            Self::Attached { pid } => write!(f, "ProcessHandle::Attached({})", pid),
        }
    }
}
