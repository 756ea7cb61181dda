//! Configuration validation. Violations are fatal at startup.

use anyhow::{bail, Result};
use std::collections::HashSet;

use super::WatchdogConfig;

pub fn validate_config(config: &WatchdogConfig) -> Result<()> {
    if config.targets.is_empty() {
        bail!("no targets configured; nothing to supervise");
    }

    if config.watchdog.tick_interval.is_zero() {
        bail!("tick_interval must be greater than zero");
    }

    let mut seen = HashSet::new();
    for target in &config.targets {
        let name = target.name.as_str();

        if !seen.insert(name) {
            bail!("duplicate target name: {}", name);
        }

        if target.launch_path.trim().is_empty() {
            bail!("target {}: launch_path is empty", name);
        }

        if let Some(heartbeat) = &target.heartbeat {
            if heartbeat.locator.trim().is_empty() {
                bail!("target {}: heartbeat locator is empty", name);
            }
            if heartbeat.table.trim().is_empty() {
                bail!("target {}: heartbeat table is empty", name);
            }
            if heartbeat.field.trim().is_empty() {
                bail!("target {}: heartbeat field is empty", name);
            }
            if heartbeat.staleness_minutes <= 0 {
                bail!(
                    "target {}: heartbeat staleness_minutes must be positive",
                    name
                );
            }
        }
    }

    Ok(())
}
