use std::sync::Arc;

use apalis::prelude::{Attempt, Error};
use eyre::Report;
use log::info;

mod notification_handler;
pub use notification_handler::*;

mod media_scan_handler;
pub use media_scan_handler::*;

mod export_handler;
pub use export_handler::*;

mod window_tick_handler;
pub use window_tick_handler::*;

pub fn handle_result(
    result: Result<(), Report>,
    attempt: Attempt,
    job_type: &str,
    max_attempts: usize,
) -> Result<(), Error> {
    if result.is_ok() {
        info!("{} request handled successfully", job_type);
        return Ok(());
    }
    info!("{} request failed: {:?}", job_type, result);

    if attempt.current() >= max_attempts {
        info!("Max attempts ({}) reached, failing job", max_attempts);
        Err(Error::Abort(Arc::new("Failed to handle request".into())))?
    }

    Err(Error::Failed(Arc::new(
        "Failed to handle request. Retrying".into(),
    )))?
}
