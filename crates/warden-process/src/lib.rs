//! # Warden Process
//!
//! Cross-platform process primitives for the warden watchdog:
//! - Process existence checks
//! - Process-table enumeration by executable name
//! - Spawning, termination, and bounded wait-for-exit
//! - GUI responsiveness probing and window-title lookup
//! - The owned [`ProcessHandle`] type
//!
//! Every function here tolerates the target exiting between calls; races
//! surface as ordinary `false`/`None` results, never as panics.

pub mod check;
pub mod enumerate;
pub mod execute;
pub mod handle;
pub mod responsiveness;
pub mod terminate;
pub mod window;

pub use check::process_exists;
pub use enumerate::{normalize_exe_name, pids_matching_name, refresh_process_table};
pub use execute::{spawn_program, validate_launch_path};
pub use handle::ProcessHandle;
pub use responsiveness::is_responding;
pub use terminate::{force_kill, terminate_gracefully};
pub use window::window_owner_pid;
