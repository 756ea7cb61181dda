//! Heartbeat probing and the fail-open policy.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::sample::parse_heartbeat_value;
use crate::store::{HeartbeatSpec, HeartbeatStore};

/// Outcome of one heartbeat check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatVerdict {
    /// Beat present and within the staleness threshold.
    Fresh,
    /// Beat missing, unparsable, or older than the threshold.
    Stale,
    /// The store could not be queried. Treated as fresh so a flaky network
    /// cannot trigger a restart storm; the failure is logged, and callers
    /// must not behave differently than for `Fresh`.
    AssumedFresh,
}

impl HeartbeatVerdict {
    pub fn is_stale(self) -> bool {
        matches!(self, HeartbeatVerdict::Stale)
    }
}

/// Heartbeat check capability, keyed by a target's optional heartbeat
/// spec. A target without a spec has heartbeat checking disabled and is
/// always fresh.
#[async_trait]
pub trait HeartbeatProbe: Send + Sync {
    async fn check(&self, target: &str, spec: Option<&HeartbeatSpec>) -> HeartbeatVerdict;
}

/// The production probe: reads the latest beat through a
/// [`HeartbeatStore`] and compares its age against the spec's threshold.
pub struct StoreHeartbeatProbe<S> {
    store: S,
}

impl<S: HeartbeatStore> StoreHeartbeatProbe<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: HeartbeatStore> HeartbeatProbe for StoreHeartbeatProbe<S> {
    async fn check(&self, target: &str, spec: Option<&HeartbeatSpec>) -> HeartbeatVerdict {
        let Some(spec) = spec else {
            return HeartbeatVerdict::Fresh;
        };

        let value = match self.store.latest_beat(spec).await {
            Ok(value) => value,
            Err(e) => {
                warn!(target, "heartbeat store unreachable, assuming fresh: {}", e);
                return HeartbeatVerdict::AssumedFresh;
            }
        };

        let Some(value) = value else {
            debug!(target, "no heartbeat record found");
            return HeartbeatVerdict::Stale;
        };

        let Some(beat_at) = parse_heartbeat_value(&value) else {
            warn!(target, ?value, "heartbeat value unparsable, treating as stale");
            return HeartbeatVerdict::Stale;
        };

        let age = Utc::now() - beat_at;
        if age <= spec.staleness() {
            HeartbeatVerdict::Fresh
        } else {
            debug!(
                target,
                age_secs = age.num_seconds(),
                threshold_secs = spec.staleness().num_seconds(),
                "heartbeat is stale"
            );
            HeartbeatVerdict::Stale
        }
    }
}
