//! Export producer and CSV generation.
//!
//! Small result sets are generated inline on the request path; at or above
//! the configured threshold an export row is created and generation moves
//! to the export worker, leaving the row as the pollable status surface.

use crate::{
    constants::APPLICANT_EXPORT_HEADERS,
    jobs::{ExportGenerate, JobProducerError, JobProducerTrait},
    models::{ExportKind, ExportRepoModel, RepositoryError},
    repositories::{InMemoryExportRepository, Repository},
    services::{ApplicantRow, RosterError, RosterPort},
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    JobProducer(#[from] JobProducerError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV buffer error: {0}")]
    CsvBuffer(String),
}

/// What the caller gets back: the report itself, or the row to poll.
#[derive(Debug)]
pub enum ExportOutcome {
    Inline { filename: String, content: String },
    Queued(ExportRepoModel),
}

pub struct ExportService {
    export_repository: Arc<InMemoryExportRepository>,
    roster: Arc<dyn RosterPort>,
    job_producer: Arc<dyn JobProducerTrait>,
    threshold: usize,
}

impl ExportService {
    pub fn new(
        export_repository: Arc<InMemoryExportRepository>,
        roster: Arc<dyn RosterPort>,
        job_producer: Arc<dyn JobProducerTrait>,
        threshold: usize,
    ) -> Self {
        Self {
            export_repository,
            roster,
            job_producer,
            threshold,
        }
    }

    pub async fn export_applicants(
        &self,
        entity_id: &str,
        requested_by: &str,
    ) -> Result<ExportOutcome, ExportServiceError> {
        let count = self.roster.count_applicants(entity_id).await?;

        if count < self.threshold {
            let rows = self.roster.applicant_rows(entity_id).await?;
            let content = build_applicant_csv(&rows)?;
            return Ok(ExportOutcome::Inline {
                filename: format!("recruitment_{}_applicants.csv", entity_id),
                content,
            });
        }

        let export = self
            .enqueue_export_job(ExportKind::RecruitmentApplicants, entity_id, requested_by)
            .await?;
        Ok(ExportOutcome::Queued(export))
    }

    /// Creates the pollable export row and its generation job, returning the
    /// row with the broker job id recorded on it.
    pub async fn enqueue_export_job(
        &self,
        kind: ExportKind,
        entity_id: &str,
        requested_by: &str,
    ) -> Result<ExportRepoModel, ExportServiceError> {
        let export = ExportRepoModel::new(kind, entity_id, requested_by);
        let mut export = self.export_repository.create(export).await?;
        let job_id = self
            .job_producer
            .produce_export_job(
                ExportGenerate::new(export.id.clone(), export.kind, entity_id, requested_by),
                None,
            )
            .await?;
        export.job_id = Some(job_id);
        Ok(self
            .export_repository
            .update(export.id.clone(), export)
            .await?)
    }
}

/// Renders applicant rows into the CSV report, headers first.
pub fn build_applicant_csv(rows: &[ApplicantRow]) -> Result<String, ExportServiceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(APPLICANT_EXPORT_HEADERS)?;

    for row in rows {
        writer.write_record([
            row.name.as_str(),
            row.email.as_str(),
            row.roll_number.as_str(),
            row.status.as_str(),
            row.notes.as_str(),
            &row.applied_at.to_rfc3339(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportServiceError::CsvBuffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportServiceError::CsvBuffer(e.to_string()))
}
