//! Process-table enumeration by executable name.
//!
//! Name matching is extension-normalized: a trailing `.exe` is stripped
//! from both the configured name and the process-table entry, so configs
//! written for Windows targets work unchanged elsewhere. Matching is
//! case-insensitive.

use sysinfo::{ProcessesToUpdate, System};

/// Refresh the process table, dropping entries for processes that exited.
///
/// Callers keep one [`System`] alive across ticks and refresh it once per
/// probe pass rather than rebuilding the whole table on every lookup.
pub fn refresh_process_table(sys: &mut System) {
    sys.refresh_processes(ProcessesToUpdate::All, true);
}

/// Strip a trailing platform executable suffix and lowercase the rest.
pub fn normalize_exe_name(name: &str) -> String {
    let trimmed = name.trim();
    let stem = trimmed
        .strip_suffix(".exe")
        .or_else(|| trimmed.strip_suffix(".EXE"))
        .unwrap_or(trimmed);
    stem.to_ascii_lowercase()
}

/// All PIDs whose executable name matches `exe_name` after normalization,
/// in ascending PID order.
pub fn pids_matching_name(sys: &System, exe_name: &str) -> Vec<u32> {
    let wanted = normalize_exe_name(exe_name);
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut pids: Vec<u32> = sys
        .processes()
        .iter()
        .filter(|(_, process)| {
            normalize_exe_name(&process.name().to_string_lossy()) == wanted
        })
        .map(|(pid, _)| pid.as_u32())
        .collect();
    pids.sort_unstable();
    pids
}
