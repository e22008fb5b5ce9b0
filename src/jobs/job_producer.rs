//! Job producer module for enqueueing jobs to Redis queues.
//!
//! Provides functionality for producing various types of jobs:
//! - Notification delivery jobs
//! - Media scan jobs
//! - Export generation jobs
//!
//! Producers return the broker task id so callers can correlate the record
//! they just created with the job that will process it.

use crate::jobs::{ExportGenerate, Job, MediaScan, NotificationSend, Queue};
use apalis::prelude::Storage;
use apalis_redis::RedisError;
use async_trait::async_trait;
use log::info;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use super::JobType;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error, Serialize)]
pub enum JobProducerError {
    #[error("Queue error: {0}")]
    QueueError(String),
}

impl From<RedisError> for JobProducerError {
    fn from(_: RedisError) -> Self {
        JobProducerError::QueueError("Queue error".to_string())
    }
}

#[derive(Debug)]
pub struct JobProducer {
    queue: Mutex<Queue>,
}

impl Clone for JobProducer {
    fn clone(&self) -> Self {
        // We can't clone the Mutex directly, but we can create a new one with a cloned Queue
        // This requires getting the lock first
        let queue = self
            .queue
            .try_lock()
            .expect("Failed to lock queue for cloning")
            .clone();

        Self {
            queue: Mutex::new(queue),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobProducerTrait: Send + Sync {
    /// Enqueues a delivery job, optionally delayed until `scheduled_on`
    /// (unix seconds). Returns the broker task id.
    async fn produce_send_notification_job(
        &self,
        notification_send_job: NotificationSend,
        scheduled_on: Option<i64>,
    ) -> Result<String, JobProducerError>;

    async fn produce_media_scan_job(
        &self,
        media_scan_job: MediaScan,
        scheduled_on: Option<i64>,
    ) -> Result<String, JobProducerError>;

    async fn produce_export_job(
        &self,
        export_job: ExportGenerate,
        scheduled_on: Option<i64>,
    ) -> Result<String, JobProducerError>;
}

impl JobProducer {
    pub fn new(queue: Queue) -> Self {
        Self {
            queue: Mutex::new(queue.clone()),
        }
    }

    pub async fn get_queue(&self) -> Result<Queue, JobProducerError> {
        let queue = self.queue.lock().await;

        Ok(queue.clone())
    }
}

#[async_trait]
impl JobProducerTrait for JobProducer {
    async fn produce_send_notification_job(
        &self,
        notification_send_job: NotificationSend,
        scheduled_on: Option<i64>,
    ) -> Result<String, JobProducerError> {
        let mut queue = self.queue.lock().await;
        let job = Job::new(JobType::NotificationSend, notification_send_job);

        let parts = match scheduled_on {
            Some(on) => queue.notification_queue.schedule(job, on).await?,
            None => queue.notification_queue.push(job).await?,
        };

        info!("Notification Send job produced successfully");
        Ok(parts.task_id.to_string())
    }

    async fn produce_media_scan_job(
        &self,
        media_scan_job: MediaScan,
        scheduled_on: Option<i64>,
    ) -> Result<String, JobProducerError> {
        let mut queue = self.queue.lock().await;
        let job = Job::new(JobType::MediaScan, media_scan_job);

        let parts = match scheduled_on {
            Some(on) => queue.media_queue.schedule(job, on).await?,
            None => queue.media_queue.push(job).await?,
        };

        info!("Media Scan job produced successfully");
        Ok(parts.task_id.to_string())
    }

    async fn produce_export_job(
        &self,
        export_job: ExportGenerate,
        scheduled_on: Option<i64>,
    ) -> Result<String, JobProducerError> {
        let mut queue = self.queue.lock().await;
        let job = Job::new(JobType::ExportGenerate, export_job);

        let parts = match scheduled_on {
            Some(on) => queue.export_queue.schedule(job, on).await?,
            None => queue.export_queue.push(job).await?,
        };

        info!("Export job produced successfully");
        Ok(parts.task_id.to_string())
    }
}
