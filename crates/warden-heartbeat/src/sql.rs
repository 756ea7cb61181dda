//! SQL-backed heartbeat store.
//!
//! One pool per distinct store locator, created lazily and reused for the
//! life of the supervisor - connection setup dominates query cost for the
//! tiny single-row reads issued here. The row filter from configuration is
//! spliced into the statement verbatim; it is operator-supplied
//! configuration, not user input.

use std::collections::HashMap;
use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::debug;

use crate::store::{HeartbeatSpec, HeartbeatStore, HeartbeatValue};
use crate::{HeartbeatError, HeartbeatResult};

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

static INSTALL_DRIVERS: Once = Once::new();

pub struct SqlHeartbeatStore {
    pools: Mutex<HashMap<String, AnyPool>>,
    query_timeout: Duration,
}

impl SqlHeartbeatStore {
    pub fn new() -> Self {
        Self::with_query_timeout(DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_query_timeout(query_timeout: Duration) -> Self {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
        Self {
            pools: Mutex::new(HashMap::new()),
            query_timeout,
        }
    }

    async fn pool(&self, locator: &str) -> HeartbeatResult<AnyPool> {
        let mut pools = self.pools.lock().await;
        if let Some(pool) = pools.get(locator) {
            return Ok(pool.clone());
        }

        debug!(locator, "opening heartbeat store connection pool");
        let pool = AnyPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(self.query_timeout)
            .connect(locator)
            .await
            .map_err(|e| HeartbeatError::Locator {
                locator: locator.to_string(),
                reason: e.to_string(),
            })?;
        pools.insert(locator.to_string(), pool.clone());
        Ok(pool)
    }
}

impl Default for SqlHeartbeatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HeartbeatStore for SqlHeartbeatStore {
    async fn latest_beat(&self, spec: &HeartbeatSpec) -> HeartbeatResult<Option<HeartbeatValue>> {
        let pool = self.pool(&spec.locator).await?;

        let mut sql = format!("SELECT {} FROM {}", spec.field, spec.table);
        if let Some(filter) = spec.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            sql.push_str(" WHERE ");
            sql.push_str(filter);
        }
        sql.push_str(&format!(" ORDER BY {} DESC LIMIT 1", spec.field));

        let row = timeout(self.query_timeout, sqlx::query(&sql).fetch_optional(&pool))
            .await
            .map_err(|_| HeartbeatError::Timeout(self.query_timeout))?
            .map_err(|e| HeartbeatError::Query(e.to_string()))?;

        Ok(row.map(|row| decode_beat(&row)))
    }
}

/// Decode the single selected column into a raw beat value. A NULL or an
/// exotic column type decodes to `Null`, which downstream parsing treats
/// as an unparsable (stale) beat rather than a store failure.
fn decode_beat(row: &AnyRow) -> HeartbeatValue {
    if let Ok(n) = row.try_get::<i64, _>(0) {
        return HeartbeatValue::Integer(n);
    }
    if let Ok(f) = row.try_get::<f64, _>(0) {
        return HeartbeatValue::Float(f);
    }
    if let Ok(s) = row.try_get::<String, _>(0) {
        return HeartbeatValue::Text(s);
    }
    HeartbeatValue::Null
}
