//! Media malware scan worker.
//!
//! Resolves the job's storage reference to a local path (downloading remote
//! objects into scratch space), scans it, and writes the verdict onto the
//! media record. An infected file is a business rejection: the record reads
//! `Rejected` and the job acks. Scanner unavailability is an ordinary
//! retryable failure and never counts as a verdict.

use apalis::prelude::{Attempt, Data, Error};
use chrono::Utc;
use eyre::Result;
use log::{info, warn};

use crate::{
    constants::MEDIA_SCAN_MAXIMUM_RETRIES,
    jobs::{handle_result, Job, MediaScan},
    models::{AuditEntry, MediaStatus, StorageRef},
    repositories::Repository,
    services::ScanOutcome,
    AppState,
};

pub async fn media_scan_handler(
    job: Job<MediaScan>,
    state: Data<AppState>,
    attempt: Attempt,
) -> Result<(), Error> {
    info!("Handling media scan job: {:?}", job.data);

    let result = handle_request(job.data, &state, &attempt).await;

    handle_result(result, attempt, "Media Scan", MEDIA_SCAN_MAXIMUM_RETRIES)
}

async fn handle_request(request: MediaScan, state: &AppState, attempt: &Attempt) -> Result<()> {
    let mut media = state
        .media_repository
        .get_by_id(request.media_id.clone())
        .await?;

    if media.status.is_terminal() {
        info!(
            "Media '{}' already has verdict {}; skipping duplicate scan",
            media.id, media.status
        );
        return Ok(());
    }

    let outcome = match scan_storage(&request.storage, state).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if attempt.current() + 1 >= MEDIA_SCAN_MAXIMUM_RETRIES {
                state
                    .audit
                    .record(
                        AuditEntry::system("media:scan_failed", "media", media.id.clone())
                            .with_reason(e.to_string()),
                    )
                    .await;
            }
            return Err(e);
        }
    };

    media.scanned_at = Some(Utc::now());
    if outcome.infected {
        media.status = MediaStatus::Rejected;
        media.scan_result = outcome.signatures.join(", ");
        warn!(
            "Media '{}' rejected by scanner: {}",
            media.id, media.scan_result
        );
        state
            .media_repository
            .update(media.id.clone(), media.clone())
            .await?;
        state
            .audit
            .record(
                AuditEntry::system("media:rejected", "media", media.id.clone())
                    .with_reason(media.scan_result.clone()),
            )
            .await;
    } else {
        media.status = MediaStatus::Scanned;
        media.scan_result = String::new();
        state
            .media_repository
            .update(media.id.clone(), media.clone())
            .await?;
        state
            .audit
            .record(AuditEntry::system("media:scanned", "media", media.id.clone()))
            .await;
    }

    Ok(())
}

/// Fetches and scans the referenced file. The scratch guard for remote
/// downloads is dropped here on every exit path, clean or not.
async fn scan_storage(storage: &StorageRef, state: &AppState) -> Result<ScanOutcome> {
    let source = state.media_fetcher.fetch(storage).await?;
    let outcome = state.scanner.scan_path(source.path()).await?;
    Ok(outcome)
}
