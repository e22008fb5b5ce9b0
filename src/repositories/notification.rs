//! In-memory notification store. Provides full CRUD plus the status queries
//! used by the polling API layer. Implemented as a `Mutex`-protected
//! `HashMap`, mirroring how every store in this service is built.

use crate::{
    models::{NotificationRepoModel, NotificationStatus, PaginationQuery, RepositoryError},
    repositories::{PaginatedResult, Repository},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct InMemoryNotificationRepository {
    store: Mutex<HashMap<String, NotificationRepoModel>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire_lock<T>(lock: &Mutex<T>) -> Result<MutexGuard<T>, RepositoryError> {
        Ok(lock.lock().await)
    }

    /// All rows with the given status, newest first.
    pub async fn list_by_status(
        &self,
        status: NotificationStatus,
    ) -> Result<Vec<NotificationRepoModel>, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        let mut rows: Vec<NotificationRepoModel> = store
            .values()
            .filter(|n| n.status == status)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[async_trait]
impl Repository<NotificationRepoModel, String> for InMemoryNotificationRepository {
    async fn create(
        &self,
        notification: NotificationRepoModel,
    ) -> Result<NotificationRepoModel, RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;
        if store.contains_key(&notification.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "Notification with ID '{}' already exists",
                notification.id
            )));
        }
        store.insert(notification.id.clone(), notification.clone());
        Ok(notification)
    }

    async fn get_by_id(&self, id: String) -> Result<NotificationRepoModel, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        match store.get(&id) {
            Some(entity) => Ok(entity.clone()),
            None => Err(RepositoryError::NotFound(format!(
                "Notification with ID '{}' not found",
                id
            ))),
        }
    }

    async fn update(
        &self,
        id: String,
        notification: NotificationRepoModel,
    ) -> Result<NotificationRepoModel, RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;

        if !store.contains_key(&id) {
            return Err(RepositoryError::NotFound(format!(
                "Notification with ID '{}' not found",
                id
            )));
        }

        if id != notification.id {
            return Err(RepositoryError::InvalidData(format!(
                "ID mismatch: parameter '{}' does not match entity ID '{}'",
                id, notification.id
            )));
        }

        store.insert(id, notification.clone());
        Ok(notification)
    }

    async fn delete_by_id(&self, id: String) -> Result<(), RepositoryError> {
        let mut store = Self::acquire_lock(&self.store).await?;
        match store.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound(format!(
                "Notification with ID '{}' not found",
                id
            ))),
        }
    }

    async fn list_all(&self) -> Result<Vec<NotificationRepoModel>, RepositoryError> {
        let store = Self::acquire_lock(&self.store).await?;
        Ok(store.values().cloned().collect())
    }

    async fn list_paginated(
        &self,
        query: PaginationQuery,
    ) -> Result<PaginatedResult<NotificationRepoModel>, RepositoryError> {
        let total = self.count().await?;
        let start = ((query.page - 1) * query.per_page) as usize;
        let items: Vec<NotificationRepoModel> = self
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
    use crate::models::Channel;
    use serde_json::json;

    fn create_test_notification(user_id: &str) -> NotificationRepoModel {
        NotificationRepoModel::new_direct(
            user_id,
            Channel::InApp,
            "Test",
            "Test message",
            json!({}),
            None,
        )
    }

    #[tokio::test]
    async fn test_new_repository_is_empty() {
        let repo = InMemoryNotificationRepository::new();
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryNotificationRepository::new();
        let notification = create_test_notification("user-1");

        repo.create(notification.clone()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        let stored = repo.get_by_id(notification.id.clone()).await.unwrap();
        assert_eq!(stored, notification);
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let repo = InMemoryNotificationRepository::new();
        let notification = create_test_notification("user-1");

        repo.create(notification.clone()).await.unwrap();
        let result = repo.create(notification).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_status() {
        let repo = InMemoryNotificationRepository::new();
        let notification = create_test_notification("user-1");
        repo.create(notification.clone()).await.unwrap();

        let mut updated = notification.clone();
        updated.status = NotificationStatus::Sent;
        updated.attempts = 1;

        let stored = repo.update(notification.id.clone(), updated).await.unwrap();
        assert_eq!(stored.status, NotificationStatus::Sent);
        assert_eq!(stored.attempts, 1);
    }

    #[tokio::test]
    async fn test_update_nonexistent() {
        let repo = InMemoryNotificationRepository::new();
        let notification = create_test_notification("user-1");
        let result = repo.update("missing".to_string(), notification).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_with_id_mismatch() {
        let repo = InMemoryNotificationRepository::new();
        let notification = create_test_notification("user-1");
        repo.create(notification.clone()).await.unwrap();

        let mut other = create_test_notification("user-2");
        other.id = "different-id".to_string();

        let result = repo.update(notification.id, other).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let repo = InMemoryNotificationRepository::new();
        let pending = create_test_notification("user-1");
        let mut sent = create_test_notification("user-2");
        sent.status = NotificationStatus::Sent;

        repo.create(pending).await.unwrap();
        repo.create(sent).await.unwrap();

        let rows = repo
            .list_by_status(NotificationStatus::Pending)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let rows = repo.list_by_status(NotificationStatus::Sent).await.unwrap();
        assert_eq!(rows.len(), 1);
        let rows = repo
            .list_by_status(NotificationStatus::Failed)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryNotificationRepository::new();
        let notification = create_test_notification("user-1");
        repo.create(notification.clone()).await.unwrap();

        repo.delete_by_id(notification.id.clone()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);

        let result = repo.delete_by_id(notification.id).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }
}
