//! Export record model: the pollable status surface for asynchronously
//! generated reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExportKind {
    RecruitmentApplicants,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExportStatus {
    Pending,
    Completed,
    Failed,
}

impl ExportStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExportStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRepoModel {
    pub id: String,
    pub kind: ExportKind,
    /// Id of the entity being exported (e.g. a recruitment id).
    pub entity_id: String,
    pub requested_by: String,
    pub status: ExportStatus,
    /// Generated report content once completed.
    pub content: Option<String>,
    pub error: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub job_id: Option<String>,
}

impl ExportRepoModel {
    pub fn new(
        kind: ExportKind,
        entity_id: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            entity_id: entity_id.into(),
            requested_by: requested_by.into(),
            status: ExportStatus::Pending,
            content: None,
            error: String::new(),
            completed_at: None,
            created_at: Utc::now(),
            job_id: None,
        }
    }

    pub fn filename(&self) -> String {
        match self.kind {
            ExportKind::RecruitmentApplicants => {
                format!("recruitment_{}_applicants.csv", self.entity_id)
            }
        }
    }
}
