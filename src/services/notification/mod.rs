//! Notification producer: turns a recipient specification into pending
//! notification rows and delivery jobs.
//!
//! Resolution is a total function. A bounded, non-empty recipient set fans
//! out immediately into per-recipient rows; anything unbounded, unknown or
//! unresolvable becomes a single meta row whose expansion is deferred to
//! the delivery worker. Enqueueing never performs delivery.

use crate::{
    jobs::{JobProducerError, JobProducerTrait, NotificationSend},
    models::{
        Channel, GroupKind, NotificationRepoModel, RecipientSpec, RepositoryError,
    },
    repositories::{InMemoryNotificationRepository, Repository},
    services::DirectoryPort,
    utils::scheduled_on_from_delay,
};
use log::warn;
use std::{collections::HashSet, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    JobProducer(#[from] JobProducerError),
}

/// Input accepted from the CRUD layer.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub spec: RecipientSpec,
    pub channel: Channel,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub created_by: Option<String>,
    /// Optional delivery delay in milliseconds.
    pub delay_ms: Option<u64>,
}

/// Outcome of recipient resolution at enqueue time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A validated, deduplicated, non-empty set of member ids.
    Bounded(Vec<String>),
    /// Expansion is deferred to the delivery worker.
    Deferred,
}

pub struct NotificationService {
    notification_repository: Arc<InMemoryNotificationRepository>,
    directory: Arc<dyn DirectoryPort>,
    job_producer: Arc<dyn JobProducerTrait>,
}

impl NotificationService {
    pub fn new(
        notification_repository: Arc<InMemoryNotificationRepository>,
        directory: Arc<dyn DirectoryPort>,
        job_producer: Arc<dyn JobProducerTrait>,
    ) -> Self {
        Self {
            notification_repository,
            directory,
            job_producer,
        }
    }

    /// Resolves a recipient specification against the member directory.
    ///
    /// Total over all inputs: directory failures, unknown groups and empty
    /// lookups all defer rather than error, so enqueueing stays cheap and
    /// never depends on directory availability.
    pub async fn resolve_recipients(&self, spec: &RecipientSpec) -> Resolution {
        match spec {
            RecipientSpec::Direct { ids } => {
                let mut seen = HashSet::new();
                let mut valid = Vec::new();
                for id in ids {
                    if !seen.insert(id.clone()) {
                        continue;
                    }
                    match self.directory.find_member(id).await {
                        Ok(Some(_)) => valid.push(id.clone()),
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Directory lookup failed for '{}', deferring: {}", id, e);
                            return Resolution::Deferred;
                        }
                    }
                }
                if valid.is_empty() {
                    Resolution::Deferred
                } else {
                    Resolution::Bounded(valid)
                }
            }
            RecipientSpec::Group {
                kind: GroupKind::Club,
                key,
            } => match self.directory.club_core_members(key).await {
                Ok(ids) if !ids.is_empty() => {
                    let mut seen = HashSet::new();
                    Resolution::Bounded(ids.into_iter().filter(|id| seen.insert(id.clone())).collect())
                }
                Ok(_) => Resolution::Deferred,
                Err(e) => {
                    warn!("Club lookup failed for '{}', deferring: {}", key, e);
                    Resolution::Deferred
                }
            },
            RecipientSpec::Everyone => Resolution::Deferred,
        }
    }

    /// Creates the notification rows and their delivery jobs, returning the
    /// rows in their initial pending state.
    pub async fn enqueue_notification(
        &self,
        new: NewNotification,
    ) -> Result<Vec<NotificationRepoModel>, NotificationServiceError> {
        let scheduled_on = scheduled_on_from_delay(new.delay_ms);

        match self.resolve_recipients(&new.spec).await {
            Resolution::Bounded(ids) => {
                let mut rows = Vec::with_capacity(ids.len());
                for id in ids {
                    let row = self
                        .create_direct_notification(
                            &id,
                            new.channel,
                            &new.title,
                            &new.message,
                            new.data.clone(),
                            new.created_by.clone(),
                            scheduled_on,
                        )
                        .await?;
                    rows.push(row);
                }
                Ok(rows)
            }
            Resolution::Deferred => {
                let row = NotificationRepoModel::new_meta(
                    new.spec.clone(),
                    new.channel,
                    &new.title,
                    &new.message,
                    new.data.clone(),
                    new.created_by.clone(),
                );
                let mut row = self.notification_repository.create(row).await?;
                let job_id = self
                    .job_producer
                    .produce_send_notification_job(
                        NotificationSend::new(row.id.clone()),
                        scheduled_on,
                    )
                    .await?;
                row.job_id = Some(job_id);
                let row = self
                    .notification_repository
                    .update(row.id.clone(), row)
                    .await?;
                Ok(vec![row])
            }
        }
    }

    /// Creates one pending direct row and its delivery job. Also used by
    /// the delivery worker when expanding a meta notification.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_direct_notification(
        &self,
        user_id: &str,
        channel: Channel,
        title: &str,
        message: &str,
        data: serde_json::Value,
        created_by: Option<String>,
        scheduled_on: Option<i64>,
    ) -> Result<NotificationRepoModel, NotificationServiceError> {
        let row =
            NotificationRepoModel::new_direct(user_id, channel, title, message, data, created_by);
        let mut row = self.notification_repository.create(row).await?;
        let job_id = self
            .job_producer
            .produce_send_notification_job(NotificationSend::new(row.id.clone()), scheduled_on)
            .await?;
        row.job_id = Some(job_id);
        Ok(self
            .notification_repository
            .update(row.id.clone(), row)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        jobs::MockJobProducerTrait,
        models::{Audience, NotificationStatus},
        services::{InMemoryDirectory, MemberRecord},
    };
    use serde_json::json;

    fn member(id: &str) -> MemberRecord {
        MemberRecord {
            id: id.to_string(),
            name: format!("Member {}", id),
            email: Some(format!("{}@club.dev", id)),
        }
    }

    async fn service_with_members(
        ids: &[&str],
        expected_jobs: usize,
    ) -> (NotificationService, Arc<InMemoryNotificationRepository>) {
        let directory = InMemoryDirectory::new();
        for id in ids {
            directory.add_member(member(id)).await;
        }

        let mut producer = MockJobProducerTrait::new();
        producer
            .expect_produce_send_notification_job()
            .times(expected_jobs)
            .returning(|_, _| Ok("job-1".to_string()));

        let repository = Arc::new(InMemoryNotificationRepository::new());
        let service = NotificationService::new(
            repository.clone(),
            Arc::new(directory),
            Arc::new(producer),
        );
        (service, repository)
    }

    fn new_notification(spec: RecipientSpec) -> NewNotification {
        NewNotification {
            spec,
            channel: Channel::InApp,
            title: "Title".to_string(),
            message: "Message".to_string(),
            data: json!({}),
            created_by: Some("admin-1".to_string()),
            delay_ms: None,
        }
    }

    #[tokio::test]
    async fn test_bounded_spec_creates_one_row_per_recipient() {
        let (service, repository) = service_with_members(&["user-1", "user-2"], 2).await;

        let rows = service
            .enqueue_notification(new_notification(RecipientSpec::Direct {
                ids: vec![
                    "user-1".to_string(),
                    "user-2".to_string(),
                    "user-1".to_string(),
                ],
            }))
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.status, NotificationStatus::Pending);
            assert!(!row.audience.is_meta());
            assert_eq!(row.job_id.as_deref(), Some("job-1"));
        }
        assert_eq!(repository.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_everyone_defers_to_single_meta_row() {
        let (service, repository) = service_with_members(&["user-1"], 1).await;

        let rows = service
            .enqueue_notification(new_notification(RecipientSpec::Everyone))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].audience.is_meta());
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_ids_defer() {
        let (service, _repository) = service_with_members(&[], 1).await;

        let rows = service
            .enqueue_notification(new_notification(RecipientSpec::Direct {
                ids: vec!["ghost".to_string()],
            }))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].audience,
            Audience::Pending {
                spec: RecipientSpec::Direct {
                    ids: vec!["ghost".to_string()]
                }
            }
        );
    }

    #[tokio::test]
    async fn test_club_group_resolves_through_directory() {
        let directory = InMemoryDirectory::new();
        directory.add_member(member("user-1")).await;
        directory.add_member(member("user-2")).await;
        directory
            .set_club_core_members("club-1", vec!["user-1".to_string(), "user-2".to_string()])
            .await;

        let mut producer = MockJobProducerTrait::new();
        producer
            .expect_produce_send_notification_job()
            .times(2)
            .returning(|_, _| Ok("job-1".to_string()));

        let service = NotificationService::new(
            Arc::new(InMemoryNotificationRepository::new()),
            Arc::new(directory),
            Arc::new(producer),
        );

        let rows = service
            .enqueue_notification(new_notification(RecipientSpec::Group {
                kind: GroupKind::Club,
                key: "club-1".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_delay_is_forwarded_as_schedule() {
        let directory = InMemoryDirectory::new();
        directory.add_member(member("user-1")).await;

        let mut producer = MockJobProducerTrait::new();
        producer
            .expect_produce_send_notification_job()
            .withf(|_, scheduled_on| scheduled_on.is_some())
            .times(1)
            .returning(|_, _| Ok("job-1".to_string()));

        let service = NotificationService::new(
            Arc::new(InMemoryNotificationRepository::new()),
            Arc::new(directory),
            Arc::new(producer),
        );

        let mut new = new_notification(RecipientSpec::Direct {
            ids: vec!["user-1".to_string()],
        });
        new.delay_ms = Some(60_000);

        service.enqueue_notification(new).await.unwrap();
    }
}
