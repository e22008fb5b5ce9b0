/// Configuration for the service, read once at startup and injected into
/// queues, producers and workers.
use std::env;

use crate::constants::DEFAULT_EXPORT_THRESHOLD;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The URL for the Redis instance backing the queues.
    pub redis_url: String,
    /// Timeout for establishing the Redis connection, in milliseconds.
    pub redis_connection_timeout_ms: u64,
    /// Record count at or above which exports are generated asynchronously.
    pub export_threshold: usize,
    /// Host of the clamd daemon used for media scanning.
    pub clamav_host: String,
    /// Port of the clamd daemon.
    pub clamav_port: u16,
    /// Timeout for a single scan, in milliseconds.
    pub clamav_timeout_ms: u64,
    /// Base URL of the object store holding remotely stored media.
    pub object_store_url: Option<String>,
    /// URL of the delivery gateway for email/push/sms channels. When unset,
    /// deliveries fall back to log-only mode.
    pub notification_gateway_url: Option<String>,
    /// Shared secret used to sign gateway payloads.
    pub notification_signing_key: Option<String>,
}

impl ServerConfig {
    /// Creates a new `ServerConfig` instance from environment variables.
    ///
    /// # Panics
    ///
    /// This function will panic if the `REDIS_URL` environment variable is
    /// not set, as the queues cannot operate without it.
    ///
    /// # Defaults
    ///
    /// - `REDIS_CONNECTION_TIMEOUT_MS` defaults to `10000`.
    /// - `EXPORT_STREAM_THRESHOLD` defaults to `1000`.
    /// - `CLAMAV_HOST` defaults to `"127.0.0.1"`, `CLAMAV_PORT` to `3310`.
    /// - `CLAMAV_TIMEOUT_MS` defaults to `60000`.
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL").expect("REDIS_URL must be set"),
            redis_connection_timeout_ms: env::var("REDIS_CONNECTION_TIMEOUT_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10000),
            export_threshold: env::var("EXPORT_STREAM_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_EXPORT_THRESHOLD),
            clamav_host: env::var("CLAMAV_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            clamav_port: env::var("CLAMAV_PORT")
                .unwrap_or_else(|_| "3310".to_string())
                .parse()
                .unwrap_or(3310),
            clamav_timeout_ms: env::var("CLAMAV_TIMEOUT_MS")
                .unwrap_or_else(|_| "60000".to_string())
                .parse()
                .unwrap_or(60000),
            object_store_url: env::var("OBJECT_STORE_URL").ok(),
            notification_gateway_url: env::var("NOTIFICATION_GATEWAY_URL").ok(),
            notification_signing_key: env::var("NOTIFICATION_SIGNING_KEY").ok(),
        }
    }
}
