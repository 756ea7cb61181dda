//! Process termination primitives.

use warden_common::{ProcessError, ProcessResult};

/// Request graceful termination (SIGTERM on Unix, WM_CLOSE to the target's
/// top-level window on Windows, falling back to forced termination when the
/// target has no window to close).
pub fn terminate_gracefully(pid: u32) -> ProcessResult<()> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
            .map_err(|e| ProcessError::stop_failed(pid.to_string(), e.to_string()))
    }

    #[cfg(windows)]
    {
        if close_top_level_window(pid) {
            Ok(())
        } else {
            force_kill(pid)
        }
    }
}

/// Force-kill a process (SIGKILL on Unix, TerminateProcess on Windows).
pub fn force_kill(pid: u32) -> ProcessResult<()> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        kill(Pid::from_raw(pid as i32), Signal::SIGKILL)
            .map_err(|e| ProcessError::stop_failed(pid.to_string(), e.to_string()))
    }

    #[cfg(windows)]
    {
        use windows::Win32::Foundation::CloseHandle;
        use windows::Win32::System::Threading::{OpenProcess, TerminateProcess, PROCESS_TERMINATE};

        unsafe {
            let handle = match OpenProcess(PROCESS_TERMINATE, false, pid) {
                Ok(h) if !h.is_invalid() => h,
                _ => {
                    return Err(ProcessError::stop_failed(
                        pid.to_string(),
                        "failed to open process for termination",
                    ));
                }
            };

            let result = TerminateProcess(handle, 1);
            let _ = CloseHandle(handle);

            result.map_err(|e| {
                ProcessError::stop_failed(pid.to_string(), format!("TerminateProcess failed: {}", e))
            })
        }
    }
}

/// Post WM_CLOSE to the process's first visible top-level window.
/// Returns false when the process has no window to close.
#[cfg(windows)]
fn close_top_level_window(pid: u32) -> bool {
    use windows::Win32::UI::WindowsAndMessaging::{PostMessageW, WM_CLOSE};

    match crate::window::top_level_window_of(pid) {
        Some(hwnd) => unsafe {
            PostMessageW(
                hwnd,
                WM_CLOSE,
                windows::Win32::Foundation::WPARAM(0),
                windows::Win32::Foundation::LPARAM(0),
            )
            .is_ok()
        },
        None => false,
    }
}
