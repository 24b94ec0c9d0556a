// Time conversions shared by the engine's feed adapters and log output.
use chrono::{DateTime, Utc};

/// Exchange timestamps arrive in milliseconds; candles are keyed in seconds.
pub fn millis_to_secs(ms: i64) -> i64 {
    ms.div_euclid(1000)
}

pub fn secs_to_millis(secs: i64) -> i64 {
    secs * 1000
}

pub fn secs_to_datetime(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Human readable UTC time for log lines; falls back to the raw number.
pub fn format_secs(secs: i64) -> String {
    secs_to_datetime(secs)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}
