use chrono::Utc;

/// Converts an optional delivery delay in milliseconds into the absolute
/// unix timestamp (seconds) the broker schedules on. `None` means deliver
/// as soon as a worker is free.
pub fn scheduled_on_from_delay(delay_ms: Option<u64>) -> Option<i64> {
    delay_ms.map(|ms| Utc::now().timestamp() + (ms / 1000) as i64)
}
