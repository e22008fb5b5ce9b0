//! Integration tests for the producer pipeline: enqueueing notifications,
//! media scans and exports through the public service APIs, with a
//! recording job producer standing in for the Redis-backed queues.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use club_backend::{
    jobs::{
        ExportGenerate, JobProducerError, JobProducerTrait, MediaScan, NotificationSend,
    },
    models::{
        Channel, ExportStatus, GroupKind, MediaStatus, NotificationStatus, RecipientSpec,
        StorageRef,
    },
    repositories::{
        InMemoryExportRepository, InMemoryMediaRepository, InMemoryNotificationRepository,
        Repository,
    },
    services::{
        ApplicantRow, ExportOutcome, ExportService, InMemoryDirectory, InMemoryRoster,
        MediaService, MemberRecord, NewNotification, NotificationService,
    },
};
use serde_json::json;
use tokio::sync::Mutex;

/// Captures every produced job so tests can assert on the pipeline's output
/// without a running broker.
#[derive(Default)]
struct RecordingProducer {
    notification_jobs: Mutex<Vec<NotificationSend>>,
    media_jobs: Mutex<Vec<MediaScan>>,
    export_jobs: Mutex<Vec<ExportGenerate>>,
}

#[async_trait]
impl JobProducerTrait for RecordingProducer {
    async fn produce_send_notification_job(
        &self,
        notification_send_job: NotificationSend,
        _scheduled_on: Option<i64>,
    ) -> Result<String, JobProducerError> {
        let mut jobs = self.notification_jobs.lock().await;
        jobs.push(notification_send_job);
        Ok(format!("job-{}", jobs.len()))
    }

    async fn produce_media_scan_job(
        &self,
        media_scan_job: MediaScan,
        _scheduled_on: Option<i64>,
    ) -> Result<String, JobProducerError> {
        let mut jobs = self.media_jobs.lock().await;
        jobs.push(media_scan_job);
        Ok(format!("job-{}", jobs.len()))
    }

    async fn produce_export_job(
        &self,
        export_job: ExportGenerate,
        _scheduled_on: Option<i64>,
    ) -> Result<String, JobProducerError> {
        let mut jobs = self.export_jobs.lock().await;
        jobs.push(export_job);
        Ok(format!("job-{}", jobs.len()))
    }
}

fn member(id: &str) -> MemberRecord {
    MemberRecord {
        id: id.to_string(),
        name: format!("Member {}", id),
        email: Some(format!("{}@club.dev", id)),
    }
}

fn applicant(name: &str) -> ApplicantRow {
    ApplicantRow {
        name: name.to_string(),
        email: format!("{}@club.dev", name.to_lowercase()),
        roll_number: "21CS001".to_string(),
        status: "applied".to_string(),
        notes: String::new(),
        applied_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_club_announcement_creates_one_row_and_job_per_core_member() {
    let directory = InMemoryDirectory::new();
    directory.add_member(member("user-1")).await;
    directory.add_member(member("user-2")).await;
    directory
        .set_club_core_members("club-1", vec!["user-1".to_string(), "user-2".to_string()])
        .await;

    let producer = Arc::new(RecordingProducer::default());
    let repository = Arc::new(InMemoryNotificationRepository::new());
    let service = NotificationService::new(
        repository.clone(),
        Arc::new(directory),
        producer.clone(),
    );

    let rows = service
        .enqueue_notification(NewNotification {
            spec: RecipientSpec::Group {
                kind: GroupKind::Club,
                key: "club-1".to_string(),
            },
            channel: Channel::InApp,
            title: "Meeting tonight".to_string(),
            message: "Common room, 7pm".to_string(),
            data: json!({}),
            created_by: Some("admin-1".to_string()),
            delay_ms: None,
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.status, NotificationStatus::Pending);
        assert!(row.job_id.is_some());
    }
    assert_eq!(repository.count().await.unwrap(), 2);

    // Each produced job targets the row it was created for
    let jobs = producer.notification_jobs.lock().await;
    assert_eq!(jobs.len(), 2);
    for row in &rows {
        assert!(jobs.iter().any(|job| job.notification_id == row.id));
    }
}

#[tokio::test]
async fn test_everyone_announcement_defers_to_a_single_meta_row() {
    let producer = Arc::new(RecordingProducer::default());
    let repository = Arc::new(InMemoryNotificationRepository::new());
    let service = NotificationService::new(
        repository.clone(),
        Arc::new(InMemoryDirectory::new()),
        producer.clone(),
    );

    let rows = service
        .enqueue_notification(NewNotification {
            spec: RecipientSpec::Everyone,
            channel: Channel::InApp,
            title: "Fest announcement".to_string(),
            message: "Registrations open".to_string(),
            data: json!({}),
            created_by: None,
            delay_ms: None,
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows[0].audience.is_meta());
    assert_eq!(repository.count().await.unwrap(), 1);
    assert_eq!(producer.notification_jobs.lock().await.len(), 1);
}

#[tokio::test]
async fn test_media_upload_queues_a_scan_for_its_record() {
    let producer = Arc::new(RecordingProducer::default());
    let repository = Arc::new(InMemoryMediaRepository::new());
    let service = MediaService::new(repository.clone(), producer.clone());

    let media = service
        .submit_for_scan(
            "poster.png",
            StorageRef::Remote {
                key: "ab/cd.png".to_string(),
            },
            "user-1",
        )
        .await
        .unwrap();

    assert_eq!(media.status, MediaStatus::Pending);
    assert_eq!(repository.count().await.unwrap(), 1);

    let jobs = producer.media_jobs.lock().await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].media_id, media.id);
}

#[tokio::test]
async fn test_export_moves_to_worker_at_threshold() {
    let roster = InMemoryRoster::new();
    roster
        .set_applicants(
            "rec-1",
            vec![applicant("Ada"), applicant("Grace"), applicant("Edsger")],
        )
        .await;

    let producer = Arc::new(RecordingProducer::default());
    let repository = Arc::new(InMemoryExportRepository::new());
    let service = ExportService::new(
        repository.clone(),
        Arc::new(roster),
        producer.clone(),
        3,
    );

    let outcome = service.export_applicants("rec-1", "admin-1").await.unwrap();
    let export = match outcome {
        ExportOutcome::Queued(export) => export,
        ExportOutcome::Inline { .. } => panic!("Expected queued export"),
    };
    assert_eq!(export.status, ExportStatus::Pending);
    assert_eq!(repository.count().await.unwrap(), 1);

    let jobs = producer.export_jobs.lock().await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].export_id, export.id);
    assert_eq!(jobs[0].entity_id, "rec-1");
}

#[tokio::test]
async fn test_export_stays_inline_below_threshold() {
    let roster = InMemoryRoster::new();
    roster
        .set_applicants("rec-1", vec![applicant("Ada")])
        .await;

    let producer = Arc::new(RecordingProducer::default());
    let repository = Arc::new(InMemoryExportRepository::new());
    let service = ExportService::new(
        repository.clone(),
        Arc::new(roster),
        producer.clone(),
        100,
    );

    let outcome = service.export_applicants("rec-1", "admin-1").await.unwrap();
    match outcome {
        ExportOutcome::Inline { filename, content } => {
            assert_eq!(filename, "recruitment_rec-1_applicants.csv");
            assert_eq!(content.lines().count(), 2);
        }
        ExportOutcome::Queued(_) => panic!("Expected inline export"),
    }
    assert_eq!(repository.count().await.unwrap(), 0);
    assert!(producer.export_jobs.lock().await.is_empty());
}
