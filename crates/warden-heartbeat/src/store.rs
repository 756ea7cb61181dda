//! The narrow read interface to the heartbeat store.

use async_trait::async_trait;
use serde::Deserialize;

use crate::HeartbeatResult;

/// Per-target heartbeat configuration, embedded in the target spec.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatSpec {
    /// Store locator - a database URL (`sqlite:`, `postgres:`, `mysql:`).
    pub locator: String,

    /// Table the target writes its beats into.
    pub table: String,

    /// Optional row filter, passed through to the store verbatim.
    #[serde(default)]
    pub filter: Option<String>,

    /// Column holding the beat timestamp.
    pub field: String,

    /// Maximum acceptable beat age, in minutes.
    #[serde(default = "default_staleness_minutes")]
    pub staleness_minutes: i64,
}

impl HeartbeatSpec {
    /// The staleness threshold as a duration.
    pub fn staleness(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.staleness_minutes)
    }
}

fn default_staleness_minutes() -> i64 {
    5
}

/// Raw value read from the store's timestamp column. Interpretation
/// (epoch magnitude, ISO strings) happens in [`crate::sample`].
#[derive(Debug, Clone, PartialEq)]
pub enum HeartbeatValue {
    Integer(i64),
    Float(f64),
    Text(String),
    /// NULL or a column type the driver could not decode.
    Null,
}

/// Read interface to the heartbeat store: fetch the single most recent
/// beat value matching a target's spec, or `None` when no row matches.
#[async_trait]
pub trait HeartbeatStore: Send + Sync {
    async fn latest_beat(&self, spec: &HeartbeatSpec) -> HeartbeatResult<Option<HeartbeatValue>>;
}
