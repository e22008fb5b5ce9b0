//! Media intake producer: records an accepted upload and queues its scan.

use crate::{
    jobs::{JobProducerError, JobProducerTrait, MediaScan},
    models::{MediaRepoModel, RepositoryError, StorageRef},
    repositories::{InMemoryMediaRepository, Repository},
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    JobProducer(#[from] JobProducerError),
}

pub struct MediaService {
    media_repository: Arc<InMemoryMediaRepository>,
    job_producer: Arc<dyn JobProducerTrait>,
}

impl MediaService {
    pub fn new(
        media_repository: Arc<InMemoryMediaRepository>,
        job_producer: Arc<dyn JobProducerTrait>,
    ) -> Self {
        Self {
            media_repository,
            job_producer,
        }
    }

    /// Creates a pending media row and enqueues its scan job. The upload is
    /// visible (and pending) immediately; the verdict arrives via the worker.
    pub async fn submit_for_scan(
        &self,
        filename: impl Into<String>,
        storage: StorageRef,
        uploaded_by: impl Into<String>,
    ) -> Result<MediaRepoModel, MediaServiceError> {
        let media = MediaRepoModel::new(filename, storage.clone(), uploaded_by);
        let media = self.media_repository.create(media).await?;

        self.job_producer
            .produce_media_scan_job(MediaScan::new(media.id.clone(), storage), None)
            .await?;

        Ok(media)
    }
}
