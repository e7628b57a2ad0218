//! Time utilities.

use chrono::{DateTime, TimeZone, Utc};

/// Current wall-clock time as Unix milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a Unix-millisecond timestamp as RFC3339 (UTC).
/// Out-of-range values fall back to the raw number.
pub fn millis_to_rfc3339(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => to_rfc3339_utc(dt),
        None => ms.to_string(),
    }
}

/// Helper: format a UTC time into RFC3339.
pub fn to_rfc3339_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
