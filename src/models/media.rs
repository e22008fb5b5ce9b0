//! Media record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// Where an accepted upload lives: on the local filesystem or in the remote
/// object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "storage_type", rename_all = "snake_case")]
pub enum StorageRef {
    Local { path: String },
    Remote { key: String },
}

/// Scan status of a media row. `Pending` transitions exactly once, to
/// `Scanned` or `Rejected`; there is no re-scan path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MediaStatus {
    Pending,
    Scanned,
    Rejected,
}

impl MediaStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MediaStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRepoModel {
    pub id: String,
    pub filename: String,
    pub storage: StorageRef,
    pub status: MediaStatus,
    /// Comma-joined signature names when rejected, empty when clean.
    pub scan_result: String,
    pub scanned_at: Option<DateTime<Utc>>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

impl MediaRepoModel {
    pub fn new(
        filename: impl Into<String>,
        storage: StorageRef,
        uploaded_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename: filename.into(),
            storage,
            status: MediaStatus::Pending,
            scan_result: String::new(),
            scanned_at: None,
            uploaded_by: uploaded_by.into(),
            created_at: Utc::now(),
        }
    }
}
