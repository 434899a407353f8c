use chrono::{DateTime, Utc};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Current wall-clock time as a `DateTime<Utc>`, used for record timestamps.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
