//! In-memory export store, polled by the API layer for job progress.

use crate::{
    models::{ExportRepoModel, PaginationQuery, RepositoryError},
    repositories::{PaginatedResult, Repository},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct InMemoryExportRepository {
    store: Mutex<HashMap<String, ExportRepoModel>>,
}

impl InMemoryExportRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire_lock<T>(lock: &Mutex<T>) -> Result<MutexGuard<T>, RepositoryError> {
        Ok(lock.lock().await)
    }
}

#[async_trait]
impl Repository<ExportRepoModel, String> for InMemoryExportRepository {
    async fn create(&self, export: ExportRepoModel) -> Result<ExportRepoModel, RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;
        if store.contains_key(&export.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "Export with ID '{}' already exists",
                export.id
            )));
        }
        store.insert(export.id.clone(), export.clone());
        Ok(export)
    }

    async fn get_by_id(&self, id: String) -> Result<ExportRepoModel, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        match store.get(&id) {
            Some(entity) => Ok(entity.clone()),
            None => Err(RepositoryError::NotFound(format!(
                "Export with ID '{}' not found",
                id
            ))),
        }
    }

    async fn update(
        &self,
        id: String,
        export: ExportRepoModel,
    ) -> Result<ExportRepoModel, RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;

        if !store.contains_key(&id) {
            return Err(RepositoryError::NotFound(format!(
                "Export with ID '{}' not found",
                id
            )));
        }

        if id != export.id {
            return Err(RepositoryError::InvalidData(format!(
                "ID mismatch: parameter '{}' does not match entity ID '{}'",
                id, export.id
            )));
        }

        store.insert(id, export.clone());
        Ok(export)
    }

    async fn delete_by_id(&self, id: String) -> Result<(), RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;
        match store.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound(format!(
                "Export with ID '{}' not found",
                id
            ))),
        }
    }

    async fn list_all(&self) -> Result<Vec<ExportRepoModel>, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store.values().cloned().collect())
    }

    async fn list_paginated(
        &self,
        query: PaginationQuery,
    ) -> Result<PaginatedResult<ExportRepoModel>, RepositoryError> {
        let total = self.count().await?;
        let start = ((query.page - 1) * query.per_page) as usize;
        let items: Vec<ExportRepoModel> = self
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
