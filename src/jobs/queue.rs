//! Queue management module for job processing.
//!
//! This module provides Redis-backed queue implementation for handling
//! different types of jobs:
//! - Notification delivery
//! - Media scanning
//! - Export generation
use apalis_redis::{Config, RedisStorage};
use color_eyre::{eyre, Result};
use log::error;
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Duration};

use crate::{
    config::ServerConfig,
    constants::{
        EXPORT_QUEUE_NAMESPACE, MEDIA_QUEUE_NAMESPACE, MEDIA_SCAN_MAXIMUM_RETRIES,
        NOTIFICATION_QUEUE_NAMESPACE, WORKER_DEFAULT_MAXIMUM_RETRIES,
    },
};

use super::{ExportGenerate, Job, MediaScan, NotificationSend};

#[derive(Clone, Debug)]
pub struct Queue {
    pub notification_queue: RedisStorage<Job<NotificationSend>>,
    pub media_queue: RedisStorage<Job<MediaScan>>,
    pub export_queue: RedisStorage<Job<ExportGenerate>>,
}

impl Queue {
    async fn storage<T: Serialize + for<'de> Deserialize<'de>>(
        config: &ServerConfig,
        namespace: &str,
        max_retries: usize,
    ) -> Result<RedisStorage<T>> {
        let redis_url = config.redis_url.clone();
        let redis_connection_timeout_ms = config.redis_connection_timeout_ms;
        let conn = match timeout(Duration::from_millis(redis_connection_timeout_ms), apalis_redis::connect(redis_url.clone())).await {
            Ok(result) => result.map_err(|e| {
                error!("Failed to connect to Redis at {}: {}", redis_url, e);
                eyre::eyre!("Failed to connect to Redis. Please ensure Redis is running and accessible at {}. Error: {}", redis_url, e)
            })?,
            Err(_) => {
                error!("Timeout connecting to Redis at {}", redis_url);
                return Err(eyre::eyre!("Timed out after {} milliseconds while connecting to Redis at {}", redis_connection_timeout_ms, redis_url));
            }
        };
        let storage_config = Config::default()
            .set_namespace(namespace)
            .set_max_retries(max_retries);

        Ok(RedisStorage::new_with_config(conn, storage_config))
    }

    pub async fn setup(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            notification_queue: Self::storage(
                config,
                NOTIFICATION_QUEUE_NAMESPACE,
                WORKER_DEFAULT_MAXIMUM_RETRIES,
            )
            .await?,
            media_queue: Self::storage(config, MEDIA_QUEUE_NAMESPACE, MEDIA_SCAN_MAXIMUM_RETRIES)
                .await?,
            export_queue: Self::storage(
                config,
                EXPORT_QUEUE_NAMESPACE,
                WORKER_DEFAULT_MAXIMUM_RETRIES,
            )
            .await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_storage_configuration() {
        // Test the config creation logic without actual Redis connections
        let namespace = "test_namespace";
        let config = Config::default()
            .set_namespace(namespace)
            .set_max_retries(5);

        assert_eq!(config.get_namespace(), namespace);
        assert_eq!(config.get_max_retries(), 5);
    }

    #[test]
    fn test_media_queue_uses_reduced_retry_ceiling() {
        assert!(MEDIA_SCAN_MAXIMUM_RETRIES < WORKER_DEFAULT_MAXIMUM_RETRIES);
    }

    #[test]
    fn test_queue_namespaces_are_distinct() {
        let namespaces = [
            NOTIFICATION_QUEUE_NAMESPACE,
            MEDIA_QUEUE_NAMESPACE,
            EXPORT_QUEUE_NAMESPACE,
        ];
        for (i, a) in namespaces.iter().enumerate() {
            for b in namespaces.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
