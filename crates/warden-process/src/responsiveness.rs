//! GUI responsiveness probing.
//!
//! A process can exist in the process table and still be wedged. On
//! Windows the message-pump hang check answers this for GUI processes; for
//! processes with no window the question does not apply and the result is
//! `None` (callers treat alive-but-unprobeable as responsive). On Unix the
//! closest process-table signal is the zombie state: the process object
//! exists but nothing is running behind it.

use sysinfo::System;

/// Whether the process is responding to its platform's idle check.
///
/// `Some(true)` - probed and responsive.
/// `Some(false)` - probed and hung.
/// `None` - the check does not apply to this process.
#[cfg(windows)]
pub fn is_responding(_sys: &System, pid: u32) -> Option<bool> {
    use windows::Win32::UI::WindowsAndMessaging::IsHungAppWindow;

    let hwnd = crate::window::top_level_window_of(pid)?;
    let hung = unsafe { IsHungAppWindow(hwnd).as_bool() };
    Some(!hung)
}

/// Whether the process is responding to its platform's idle check.
///
/// `Some(false)` for zombies; otherwise `None` - there is no portable
/// "responding" notion for an arbitrary Unix process.
#[cfg(not(windows))]
pub fn is_responding(sys: &System, pid: u32) -> Option<bool> {
    use sysinfo::{Pid, ProcessStatus};

    match sys.process(Pid::from_u32(pid)) {
        Some(process) if matches!(process.status(), ProcessStatus::Zombie) => Some(false),
        _ => None,
    }
}
