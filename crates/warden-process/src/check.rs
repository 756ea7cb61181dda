//! Process existence checking.

use warden_common::{ProcessError, ProcessResult};

/// Check whether a process with the given PID is currently alive.
///
/// Non-destructive: on Unix this is `kill(pid, 0)`, which delivers no
/// signal; on Windows it opens the process with query-only rights. A PID we
/// lack permission to signal still counts as alive.
pub fn process_exists(pid: u32) -> ProcessResult<bool> {
    #[cfg(unix)]
    {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        match kill(Pid::from_raw(pid as i32), None) {
            Ok(_) => Ok(true),
            Err(nix::errno::Errno::ESRCH) => Ok(false),
            Err(nix::errno::Errno::EPERM) => Ok(true),
            Err(e) => Err(ProcessError::configuration(
                pid.to_string(),
                format!("existence check failed: {}", e),
            )),
        }
    }

    #[cfg(windows)]
    {
        use windows::Win32::Foundation::CloseHandle;
        use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};

        unsafe {
            match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
                Ok(handle) => {
                    let _ = CloseHandle(handle);
                    Ok(true)
                }
                // Both "invalid parameter" and "access denied" mean the PID
                // no longer names a process we could ever open; anything
                // else is a genuine failure worth surfacing.
                Err(e) => {
                    const ERROR_INVALID_PARAMETER: u32 = 0x80070057;
                    const ERROR_ACCESS_DENIED: u32 = 0x80070005;
                    let code = e.code().0 as u32;
                    if code == ERROR_INVALID_PARAMETER || code == ERROR_ACCESS_DENIED {
                        Ok(false)
                    } else {
                        Err(ProcessError::configuration(
                            pid.to_string(),
                            format!("existence check failed: {}", e),
                        ))
                    }
                }
            }
        }
    }
}
