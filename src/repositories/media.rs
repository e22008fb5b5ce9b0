//! In-memory media store.

use crate::{
    models::{MediaRepoModel, MediaStatus, PaginationQuery, RepositoryError},
    repositories::{PaginatedResult, Repository},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct InMemoryMediaRepository {
    store: Mutex<HashMap<String, MediaRepoModel>>,
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire_lock<T>(lock: &Mutex<T>) -> Result<MutexGuard<T>, RepositoryError> {
        Ok(lock.lock().await)
    }

    /// Rows still waiting for a scan verdict.
    pub async fn list_pending(&self) -> Result<Vec<MediaRepoModel>, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store
            .values()
            .filter(|m| m.status == MediaStatus::Pending)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Repository<MediaRepoModel, String> for InMemoryMediaRepository {
    async fn create(&self, media: MediaRepoModel) -> Result<MediaRepoModel, RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;
        if store.contains_key(&media.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "Media with ID '{}' already exists",
                media.id
            )));
        }
        store.insert(media.id.clone(), media.clone());
        Ok(media)
    }

    async fn get_by_id(&self, id: String) -> Result<MediaRepoModel, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        match store.get(&id) {
            Some(entity) => Ok(entity.clone()),
            None => Err(RepositoryError::NotFound(format!(
                "Media with ID '{}' not found",
                id
            ))),
        }
    }

    async fn update(
        &self,
        id: String,
        media: MediaRepoModel,
    ) -> Result<MediaRepoModel, RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;

        if !store.contains_key(&id) {
            return Err(RepositoryError::NotFound(format!(
                "Media with ID '{}' not found",
                id
            )));
        }

        if id != media.id {
            return Err(RepositoryError::InvalidData(format!(
                "ID mismatch: parameter '{}' does not match entity ID '{}'",
                id, media.id
            )));
        }

        store.insert(id, media.clone());
        Ok(media)
    }

    async fn delete_by_id(&self, id: String) -> Result<(), RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;
        match store.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound(format!(
                "Media with ID '{}' not found",
                id
            ))),
        }
    }

    async fn list_all(&self) -> Result<Vec<MediaRepoModel>, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store.values().cloned().collect())
    }

    async fn list_paginated(
        &self,
        query: PaginationQuery,
    ) -> Result<PaginatedResult<MediaRepoModel>, RepositoryError> {
        let total = self.count().await?;
        let start = ((query.page - 1) * query.per_page) as usize;
        let items: Vec<MediaRepoModel> = self
            .store
            .lock()
            .await
            .values()
            .skip(start)
            .take(query.per_page as usize)
            .cloned()
            .collect();

        Ok(PaginatedResult {
            items,
            total: total as u64,
            page: query.page,
            per_page: query.per_page,
        })
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store.len())
    }
}
