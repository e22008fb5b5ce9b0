//! In-memory recruitment window store, driven by the cron scheduler.

use crate::{
    models::{PaginationQuery, RecruitmentWindowModel, RepositoryError, WindowState},
    repositories::{PaginatedResult, Repository},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct InMemoryRecruitmentWindowRepository {
    store: Mutex<HashMap<String, RecruitmentWindowModel>>,
}

impl InMemoryRecruitmentWindowRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire_lock<T>(lock: &Mutex<T>) -> Result<MutexGuard<T>, RepositoryError> {
        Ok(lock.lock().await)
    }

    /// Scheduled windows whose opening time has passed.
    pub async fn list_due_to_open(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<RecruitmentWindowModel>, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store
            .values()
            .filter(|w| w.state == WindowState::Scheduled && w.opens_at <= now)
            .cloned()
            .collect())
    }

    /// Open windows whose closing time has passed.
    pub async fn list_due_to_close(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<RecruitmentWindowModel>, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store
            .values()
            .filter(|w| w.state == WindowState::Open && w.closes_at <= now)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Repository<RecruitmentWindowModel, String> for InMemoryRecruitmentWindowRepository {
    async fn create(
        &self,
        window: RecruitmentWindowModel,
    ) -> Result<RecruitmentWindowModel, RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;
        if store.contains_key(&window.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "Recruitment window with ID '{}' already exists",
                window.id
            )));
        }
        store.insert(window.id.clone(), window.clone());
        Ok(window)
    }

    async fn get_by_id(&self, id: String) -> Result<RecruitmentWindowModel, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        match store.get(&id) {
            Some(entity) => Ok(entity.clone()),
            None => Err(RepositoryError::NotFound(format!(
                "Recruitment window with ID '{}' not found",
                id
            ))),
        }
    }

    async fn update(
        &self,
        id: String,
        window: RecruitmentWindowModel,
    ) -> Result<RecruitmentWindowModel, RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;

        if !store.contains_key(&id) {
            return Err(RepositoryError::NotFound(format!(
                "Recruitment window with ID '{}' not found",
                id
            )));
        }

        if id != window.id {
            return Err(RepositoryError::InvalidData(format!(
                "ID mismatch: parameter '{}' does not match entity ID '{}'",
                id, window.id
            )));
        }

        store.insert(id, window.clone());
        Ok(window)
    }

    async fn delete_by_id(&self, id: String) -> Result<(), RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;
        match store.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound(format!(
                "Recruitment window with ID '{}' not found",
                id
            ))),
        }
    }

    async fn list_all(&self) -> Result<Vec<RecruitmentWindowModel>, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store.values().cloned().collect())
    }

    async fn list_paginated(
        &self,
        query: PaginationQuery,
    ) -> Result<PaginatedResult<RecruitmentWindowModel>, RepositoryError> {
        let total = self.count().await?;
        let start = ((query.page - 1) * query.per_page) as usize;
        let items: Vec<RecruitmentWindowModel> = self
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn window(opens_in_minutes: i64, closes_in_minutes: i64) -> RecruitmentWindowModel {
        let now = Utc::now();
        RecruitmentWindowModel::new(
            "club-1",
            "Designer",
            now + Duration::minutes(opens_in_minutes),
            now + Duration::minutes(closes_in_minutes),
        )
    }

    #[tokio::test]
    async fn test_due_to_open() {
        let repo = InMemoryRecruitmentWindowRepository::new();
        repo.create(window(-5, 60)).await.unwrap();
        repo.create(window(5, 60)).await.unwrap();

        let due = repo.list_due_to_open(Utc::now()).await.unwrap();
        assert_eq!(due.len(), 1);
    }

    #[tokio::test]
    async fn test_due_to_close_only_open_windows() {
        let repo = InMemoryRecruitmentWindowRepository::new();
        // Past closing time but never opened: not eligible.
        repo.create(window(-10, -5)).await.unwrap();

        let mut open = window(-10, -5);
        open.state = WindowState::Open;
        repo.create(open.clone()).await.unwrap();

        let due = repo.list_due_to_close(Utc::now()).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, open.id);
    }
}
