//! Job processing module for handling asynchronous tasks.
//!
//! Provides generic job structure for different types of operations:
//! - Notification delivery and fan-out
//! - Media malware scanning
//! - Export generation
use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::models::{ExportKind, StorageRef};

// Common message structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Job<T> {
    pub message_id: String,
    pub version: String,
    pub timestamp: String,
    pub job_type: JobType,
    pub data: T,
}

impl<T> Job<T> {
    pub fn new(job_type: JobType, data: T) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            version: "1.0".to_string(),
            timestamp: Utc::now().timestamp().to_string(),
            job_type,
            data,
        }
    }
}

// Enum to represent different message types
#[derive(Debug, Serialize, Deserialize, Display, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobType {
    NotificationSend,
    MediaScan,
    ExportGenerate,
}

/// Payload of a delivery job. The record carries the audience, channel and
/// content; the job only references it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationSend {
    pub notification_id: String,
}

impl NotificationSend {
    pub fn new(notification_id: impl Into<String>) -> Self {
        Self {
            notification_id: notification_id.into(),
        }
    }
}

/// Payload of a media scan job.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaScan {
    pub media_id: String,
    pub storage: StorageRef,
}

impl MediaScan {
    pub fn new(media_id: impl Into<String>, storage: StorageRef) -> Self {
        Self {
            media_id: media_id.into(),
            storage,
        }
    }
}

/// Payload of an export generation job.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportGenerate {
    pub export_id: String,
    pub kind: ExportKind,
    pub entity_id: String,
    pub requested_by: String,
}

impl ExportGenerate {
    pub fn new(
        export_id: impl Into<String>,
        kind: ExportKind,
        entity_id: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            export_id: export_id.into(),
            kind,
            entity_id: entity_id.into(),
            requested_by: requested_by.into(),
        }
    }
}
