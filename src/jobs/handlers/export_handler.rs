//! Export generation worker.
//!
//! Generates the CSV for exports that crossed the synchronous threshold and
//! stores it on the export row, which callers poll. Failures retry; once
//! attempts are exhausted the row is marked `Failed` with the error.

use apalis::prelude::{Attempt, Data, Error};
use chrono::Utc;
use eyre::Result;
use log::info;

use crate::{
    constants::WORKER_DEFAULT_MAXIMUM_RETRIES,
    jobs::{handle_result, ExportGenerate, Job},
    models::ExportStatus,
    repositories::Repository,
    services::build_applicant_csv,
    AppState,
};

pub async fn export_handler(
    job: Job<ExportGenerate>,
    state: Data<AppState>,
    attempt: Attempt,
) -> Result<(), Error> {
    info!("Handling export job: {:?}", job.data);

    let result = handle_request(job.data, &state, &attempt).await;

    handle_result(result, attempt, "Export", WORKER_DEFAULT_MAXIMUM_RETRIES)
}

async fn handle_request(request: ExportGenerate, state: &AppState, attempt: &Attempt) -> Result<()> {
    let mut export = state
        .export_repository
        .get_by_id(request.export_id.clone())
        .await?;

    if export.status.is_terminal() {
        info!(
            "Export '{}' is already {}; skipping duplicate generation",
            export.id, export.status
        );
        return Ok(());
    }

    match generate(&request, state).await {
        Ok(content) => {
            export.status = ExportStatus::Completed;
            export.content = Some(content);
            export.error = String::new();
            export.completed_at = Some(Utc::now());
            state
                .export_repository
                .update(export.id.clone(), export)
                .await?;
            Ok(())
        }
        Err(e) => {
            if attempt.current() + 1 >= WORKER_DEFAULT_MAXIMUM_RETRIES {
                export.status = ExportStatus::Failed;
                export.error = e.to_string();
                state
                    .export_repository
                    .update(export.id.clone(), export)
                    .await?;
            }
            Err(e)
        }
    }
}

async fn generate(request: &ExportGenerate, state: &AppState) -> Result<String> {
    let rows = state.roster.applicant_rows(&request.entity_id).await?;
    Ok(build_applicant_csv(&rows)?)
}
