//! Recruitment roster port, backing applicant exports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Roster unavailable: {0}")]
    Unavailable(String),
}

/// One applicant row, in the column order of the generated report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantRow {
    pub name: String,
    pub email: String,
    pub roll_number: String,
    pub status: String,
    pub notes: String,
    pub applied_at: DateTime<Utc>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RosterPort: Send + Sync {
    async fn count_applicants(&self, entity_id: &str) -> Result<usize, RosterError>;

    async fn applicant_rows(&self, entity_id: &str) -> Result<Vec<ApplicantRow>, RosterError>;
}

#[derive(Debug, Default)]
pub struct InMemoryRoster {
    rows: Mutex<HashMap<String, Vec<ApplicantRow>>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_applicants(&self, entity_id: impl Into<String>, rows: Vec<ApplicantRow>) {
        self.rows.lock().await.insert(entity_id.into(), rows);
    }
}

#[async_trait]
impl RosterPort for InMemoryRoster {
    async fn count_applicants(&self, entity_id: &str) -> Result<usize, RosterError> {
        Ok(self
            .rows
            .lock()
            .await
            .get(entity_id)
            .map(|rows| rows.len())
            .unwrap_or(0))
    }

    async fn applicant_rows(&self, entity_id: &str) -> Result<Vec<ApplicantRow>, RosterError> {
        Ok(self
            .rows
            .lock()
            .await
            .get(entity_id)
            .cloned()
            .unwrap_or_default())
    }
}
