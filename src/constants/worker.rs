use std::time::Duration;

/// Maximum number of handler attempts before a job is aborted. This is also
/// the ceiling for the per-record `attempts` bookkeeping, which mirrors the
/// broker's attempt count rather than keeping its own.
pub const WORKER_DEFAULT_MAXIMUM_RETRIES: usize = 5;

/// Media scans get fewer attempts; a scan that failed three times is an
/// operational problem, not a transient blip.
pub const MEDIA_SCAN_MAXIMUM_RETRIES: usize = 3;

pub const WORKER_DEFAULT_CONCURRENCY: usize = 2;
pub const WORKER_DEFAULT_RATE_LIMIT: u64 = 20;
pub const WORKER_DEFAULT_RATE_LIMIT_DURATION: Duration = Duration::from_secs(1);

/// Cron expression for the recruitment-window scheduler (every minute).
pub const WINDOW_SCHEDULER_CRON: &str = "0 * * * * *";
