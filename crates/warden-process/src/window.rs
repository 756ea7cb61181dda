//! Top-level window lookup.
//!
//! Two directions are needed: resolving an exact window title to its owning
//! process (the window-based liveness strategy), and finding a process's
//! visible top-level window (graceful close, hang detection). Only Windows
//! has a system-wide top-level window registry; on other platforms the
//! title lookup finds nothing and callers fall back to the tracked handle.

#[cfg(windows)]
use windows::Win32::Foundation::HWND;

/// Resolve an exact window title to the PID of its owning process.
#[cfg(windows)]
pub fn window_owner_pid(title: &str) -> Option<u32> {
    use windows::core::PCWSTR;
    use windows::Win32::UI::WindowsAndMessaging::{FindWindowW, GetWindowThreadProcessId};

    let wide: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();
    unsafe {
        let hwnd = FindWindowW(PCWSTR::null(), PCWSTR(wide.as_ptr()));
        if hwnd.0 == 0 {
            return None;
        }
        let mut pid = 0u32;
        GetWindowThreadProcessId(hwnd, Some(&mut pid));
        (pid != 0).then_some(pid)
    }
}

/// Resolve an exact window title to the PID of its owning process.
///
/// No portable equivalent exists off Windows; always `None` so the caller's
/// tracked-handle fallback applies.
#[cfg(not(windows))]
pub fn window_owner_pid(_title: &str) -> Option<u32> {
    None
}

/// First visible top-level window belonging to `pid`, if any.
#[cfg(windows)]
pub(crate) fn top_level_window_of(pid: u32) -> Option<HWND> {
    use windows::Win32::Foundation::{BOOL, LPARAM};
    use windows::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetWindowThreadProcessId, IsWindowVisible,
    };

    struct Search {
        pid: u32,
        found: Option<HWND>,
    }

    unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let search = &mut *(lparam.0 as *mut Search);
        let mut owner = 0u32;
        GetWindowThreadProcessId(hwnd, Some(&mut owner));
        if owner == search.pid && IsWindowVisible(hwnd).as_bool() {
            search.found = Some(hwnd);
            return BOOL(0); // stop enumerating
        }
        BOOL(1)
    }

    let mut search = Search { pid, found: None };
    unsafe {
        // EnumWindows reports an error when the callback stops early; that
        // is the success path here.
        let _ = EnumWindows(
            Some(enum_proc),
            LPARAM(&mut search as *mut Search as isize),
        );
    }
    search.found
}
