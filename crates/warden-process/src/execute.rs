//! Process launching.

use std::path::Path;
use std::process::{Child, Command, Stdio};
use warden_common::{ProcessError, ProcessResult};

/// Check that a configured launch path names an existing file.
///
/// A missing launch path is a configuration error, reported before any
/// relaunch is attempted so the failure reads as "fix the config", not as
/// a spawn flake.
pub fn validate_launch_path(path: &str) -> ProcessResult<()> {
    if path.trim().is_empty() {
        return Err(ProcessError::configuration(
            path,
            "launch path is empty",
        ));
    }
    if !Path::new(path).is_file() {
        return Err(ProcessError::configuration(
            path,
            "launch path does not exist",
        ));
    }
    Ok(())
}

/// Spawn the program at `path`, detached from our stdio.
///
/// The working directory is set to the executable's parent so targets that
/// load sibling assets by relative path behave as if double-clicked.
pub fn spawn_program(path: &str) -> ProcessResult<Child> {
    let mut command = Command::new(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            command.current_dir(parent);
        }
    }
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ProcessError::spawn_failed(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_path() {
        assert!(validate_launch_path("").is_err());
        assert!(validate_launch_path("   ").is_err());
    }

    #[test]
    fn test_validate_missing_path() {
        assert!(validate_launch_path("/no/such/binary/anywhere").is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_validate_existing_path() {
        assert!(validate_launch_path("/bin/sh").is_ok());
    }

    #[test]
    fn test_spawn_missing_program_fails() {
        let result = spawn_program("/no/such/binary/anywhere");
        assert!(matches!(
            result,
            Err(ProcessError::SpawnFailed { .. })
        ));
    }
}
