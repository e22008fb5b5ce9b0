//! Notification delivery worker.
//!
//! Processes delivery jobs for both row shapes: direct rows are delivered
//! through the channel transport; meta rows are expanded into per-recipient
//! direct rows and jobs, then marked `Expanded`. Redelivery of a job whose
//! record is already terminal is a no-op, which is what makes the
//! at-least-once broker safe here.

use apalis::prelude::{Attempt, Data, Error};
use chrono::Utc;
use eyre::{eyre, Result};
use log::{info, warn};
use std::collections::HashSet;

use crate::{
    constants::WORKER_DEFAULT_MAXIMUM_RETRIES,
    jobs::{handle_result, Job, NotificationSend},
    models::{
        Audience, Channel, GroupKind, NotificationRepoModel, NotificationStatus, RecipientSpec,
    },
    repositories::Repository,
    services::{ChannelDelivery, NotificationService},
    AppState,
};

pub async fn notification_handler(
    job: Job<NotificationSend>,
    state: Data<AppState>,
    attempt: Attempt,
) -> Result<(), Error> {
    info!("Handling notification job: {:?}", job.data);

    let result = handle_request(job.data, &state, &attempt).await;

    handle_result(
        result,
        attempt,
        "Notification",
        WORKER_DEFAULT_MAXIMUM_RETRIES,
    )
}

async fn handle_request(
    request: NotificationSend,
    state: &AppState,
    attempt: &Attempt,
) -> Result<()> {
    let notification = state
        .notification_repository
        .get_by_id(request.notification_id.clone())
        .await
        .map_err(|e| {
            eyre!(
                "Failed to load notification '{}': {}",
                request.notification_id,
                e
            )
        })?;

    if notification.status.is_terminal() {
        info!(
            "Notification '{}' is already {}; skipping duplicate delivery",
            notification.id, notification.status
        );
        return Ok(());
    }

    // A job re-leased after a worker crash can carry a lower broker attempt
    // count than what was already recorded; `attempts` never decreases.
    let attempts = notification.attempts.max(attempt.current() as u32 + 1);

    match notification.audience.clone() {
        Audience::Member { user_id } => {
            deliver_direct(notification, &user_id, attempts, state).await
        }
        Audience::Pending { spec } => expand_meta(notification, &spec, attempts, state).await,
    }
}

async fn deliver_direct(
    mut notification: NotificationRepoModel,
    user_id: &str,
    attempts: u32,
    state: &AppState,
) -> Result<()> {
    let member = state.directory.find_member(user_id).await?;

    let Some(member) = member else {
        // Not retryable: the directory answered and the member is gone.
        notification.status = NotificationStatus::Failed;
        notification.attempts = attempts;
        notification.last_error = format!("Member '{}' not found in directory", user_id);
        state
            .notification_repository
            .update(notification.id.clone(), notification)
            .await?;
        return Ok(());
    };

    let delivery_result = match notification.channel {
        // The stored row is the in-app delivery.
        Channel::InApp => Ok(()),
        channel => match member.email {
            Some(target) => {
                state
                    .transport
                    .deliver(ChannelDelivery {
                        channel,
                        target,
                        title: notification.title.clone(),
                        message: notification.message.clone(),
                        data: notification.data.clone(),
                    })
                    .await
            }
            // No address on file; the stored row is all we can deliver.
            None => Ok(()),
        },
    };

    let notification_id = notification.id.clone();
    match delivery_result {
        Ok(()) => {
            notification.status = NotificationStatus::Sent;
            notification.attempts = attempts;
            notification.last_error = String::new();
            notification.sent_at = Some(Utc::now());
            state
                .notification_repository
                .update(notification_id, notification)
                .await?;
            Ok(())
        }
        Err(e) => {
            notification.attempts = attempts;
            notification.last_error = e.to_string();
            if attempts >= WORKER_DEFAULT_MAXIMUM_RETRIES as u32 {
                warn!(
                    "Notification '{}' failed after {} attempts",
                    notification_id, attempts
                );
                notification.status = NotificationStatus::Failed;
            }
            state
                .notification_repository
                .update(notification_id.clone(), notification)
                .await?;
            Err(eyre!(
                "Delivery failed for notification '{}': {}",
                notification_id,
                e
            ))
        }
    }
}

async fn expand_meta(
    mut notification: NotificationRepoModel,
    spec: &RecipientSpec,
    attempts: u32,
    state: &AppState,
) -> Result<()> {
    let ids = resolve_spec(spec, state).await?;

    notification.attempts = attempts;

    if ids.is_empty() {
        // Business rejection, not an infra failure: the record carries the
        // outcome and the job completes.
        notification.status = NotificationStatus::Failed;
        notification.last_error = "No resolvable recipients".to_string();
        state
            .notification_repository
            .update(notification.id.clone(), notification)
            .await?;
        return Ok(());
    }

    let service = NotificationService::new(
        state.notification_repository.clone(),
        state.directory.clone(),
        state.job_producer.clone(),
    );
    for id in &ids {
        service
            .create_direct_notification(
                id,
                notification.channel,
                &notification.title,
                &notification.message,
                notification.data.clone(),
                notification.created_by.clone(),
                None,
            )
            .await?;
    }

    notification.status = NotificationStatus::Expanded;
    notification.last_error = String::new();
    let notification_id = notification.id.clone();
    state
        .notification_repository
        .update(notification_id.clone(), notification)
        .await?;
    info!(
        "Expanded meta notification '{}' into {} deliveries",
        notification_id,
        ids.len()
    );
    Ok(())
}

/// Resolves a specification to a deduplicated id list. Directory failures
/// propagate as transient errors; an empty result is a valid answer.
async fn resolve_spec(spec: &RecipientSpec, state: &AppState) -> Result<Vec<String>> {
    let ids = match spec {
        RecipientSpec::Direct { ids } => {
            let mut valid = Vec::new();
            for id in ids {
                if state.directory.find_member(id).await?.is_some() {
                    valid.push(id.clone());
                }
            }
            valid
        }
        RecipientSpec::Group {
            kind: GroupKind::Club,
            key,
        } => state.directory.club_core_members(key).await?,
        RecipientSpec::Everyone => state.directory.list_member_ids().await?,
    };

    let mut seen = HashSet::new();
    Ok(ids.into_iter().filter(|id| seen.insert(id.clone())).collect())
}
