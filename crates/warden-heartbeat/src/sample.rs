//! Beat timestamp parsing.
//!
//! Targets write their beats in whatever shape their storage layer
//! produces: a native datetime rendered as text, an ISO-8601 string, or a
//! numeric epoch. Numeric epochs are disambiguated by magnitude - values
//! below 10^11 are seconds, at or above are milliseconds (10^11 seconds is
//! year 5138; 10^11 milliseconds is 1973).

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::store::HeartbeatValue;

const MILLIS_EPOCH_FLOOR: i64 = 100_000_000_000;

/// Parse a raw beat value into a UTC timestamp. `None` means the value is
/// unparsable; callers treat that as a stale beat, never as an error.
pub fn parse_heartbeat_value(value: &HeartbeatValue) -> Option<DateTime<Utc>> {
    match value {
        HeartbeatValue::Integer(n) => from_epoch(*n),
        HeartbeatValue::Float(f) if f.is_finite() => {
            if f.abs() >= MILLIS_EPOCH_FLOOR as f64 {
                DateTime::from_timestamp_millis(*f as i64)
            } else {
                DateTime::from_timestamp_millis((f * 1000.0) as i64)
            }
        }
        HeartbeatValue::Float(_) => None,
        HeartbeatValue::Text(s) => parse_text(s),
        HeartbeatValue::Null => None,
    }
}

fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    if n.abs() >= MILLIS_EPOCH_FLOOR {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }

    // Bare datetime without offset - stores commonly render TIMESTAMP
    // columns this way; beats are written in UTC by convention.
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    // Epoch stored in a text column.
    if let Ok(n) = s.parse::<i64>() {
        return from_epoch(n);
    }
    if let Ok(f) = s.parse::<f64>() {
        return parse_heartbeat_value(&HeartbeatValue::Float(f));
    }

    None
}
