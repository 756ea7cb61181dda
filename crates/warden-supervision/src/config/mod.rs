use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use warden_common::TargetName;
use warden_heartbeat::HeartbeatSpec;
use warden_notify::NotificationsConfig;

pub mod validation;

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct WatchdogConfig {
    pub watchdog: WatchdogOptions,
    #[serde(default)]
    pub notifications: Option<NotificationsConfig>,
    pub targets: Vec<TargetSpec>,
}

/// Global watchdog options
#[derive(Debug, Clone, Deserialize)]
pub struct WatchdogOptions {
    /// Pause between evaluation passes
    #[serde(default = "default_tick_interval", with = "duration_serde")]
    pub tick_interval: Duration,

    /// Pause applied after relaunching a target, before moving on
    #[serde(default = "default_settle_delay", with = "duration_serde")]
    pub settle_delay: Duration,

    /// Window after a relaunch during which a target is not evaluated
    #[serde(default = "default_grace_period", with = "duration_serde")]
    pub grace_period: Duration,

    /// Site label included in notifications
    #[serde(default)]
    pub site: Option<String>,
}

/// One supervised target
#[derive(Debug, Clone, Deserialize)]
pub struct TargetSpec {
    /// Logical name, unique across all targets
    pub name: TargetName,

    /// Path the target is (re)launched from
    pub launch_path: String,

    /// Exact window title to locate the target by, instead of matching
    /// the executable name in the process table
    #[serde(default)]
    pub window_title: Option<String>,

    /// Category label used in notifications
    #[serde(default)]
    pub category: Option<String>,

    /// Heartbeat configuration; absent means heartbeat checking is
    /// disabled for this target
    #[serde(default)]
    pub heartbeat: Option<HeartbeatSpec>,
}

impl TargetSpec {
    /// Executable name used by name-based liveness, derived from the
    /// launch path's file name.
    pub fn executable_name(&self) -> String {
        Path::new(&self.launch_path)
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl WatchdogConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.as_ref().display()))?;

        Self::load_from_string(&content)
    }

    /// Load configuration from a YAML string
    pub fn load_from_string(content: &str) -> Result<Self> {
        let mut config: WatchdogConfig =
            serde_yaml::from_str(content).context("failed to parse YAML configuration")?;

        // Entries with an empty name are never evaluated; drop them here so
        // nothing downstream has to re-check.
        let before = config.targets.len();
        config.targets.retain(|t| !t.name.is_empty());
        if config.targets.len() < before {
            warn!(
                "skipping {} target(s) with an empty name",
                before - config.targets.len()
            );
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

// Default value functions
fn default_tick_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_settle_delay() -> Duration {
    Duration::from_millis(2000)
}

fn default_grace_period() -> Duration {
    Duration::from_secs(120)
}

// Custom deserialization for Duration: accepts "30s", "1500ms", "2m", or a
// bare number of seconds.
mod duration_serde {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Seconds(u64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Seconds(secs) => Ok(Duration::from_secs(secs)),
            Repr::Text(s) => parse_duration(&s).map_err(serde::de::Error::custom),
        }
    }

    fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        // "ms" is checked before "s" since it ends with 's'.
        if let Some(num) = s.strip_suffix("ms") {
            let millis: u64 = num.parse().map_err(|_| format!("invalid duration: {}", s))?;
            Ok(Duration::from_millis(millis))
        } else if let Some(num) = s.strip_suffix('s') {
            let secs: u64 = num.parse().map_err(|_| format!("invalid duration: {}", s))?;
            Ok(Duration::from_secs(secs))
        } else if let Some(num) = s.strip_suffix('m') {
            let mins: u64 = num.parse().map_err(|_| format!("invalid duration: {}", s))?;
            Ok(Duration::from_secs(mins * 60))
        } else {
            Err(format!("duration must end with 's', 'ms', or 'm': {}", s))
        }
    }
}
