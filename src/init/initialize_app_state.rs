//! Application state initialization
//!
//! This module contains functions for initializing the application state,
//! including setting up repositories, job queues, and other necessary components.
use crate::{
    config::ServerConfig,
    jobs::{JobProducer, Queue},
    repositories::{
        InMemoryExportRepository, InMemoryMediaRepository, InMemoryNotificationRepository,
        InMemoryRecruitmentWindowRepository,
    },
    services::{
        AuditService, ChannelTransport, ClamdScanService, GatewayTransport, InMemoryAuditSink,
        InMemoryDirectory, InMemoryRoster, LogTransport, ObjectStoreFetcher,
    },
    AppState,
};
use color_eyre::Result;
use log::info;
use std::sync::Arc;

/// Initializes application state.
///
/// Returns the state bundle together with the queue it was wired around;
/// the queue is what workers consume from.
///
/// # Errors
///
/// Returns error if:
/// - Queue setup fails (Redis unreachable or connection timeout)
pub async fn initialize_app_state(config: &ServerConfig) -> Result<(AppState, Queue)> {
    let notification_repository = Arc::new(InMemoryNotificationRepository::new());
    let media_repository = Arc::new(InMemoryMediaRepository::new());
    let export_repository = Arc::new(InMemoryExportRepository::new());
    let window_repository = Arc::new(InMemoryRecruitmentWindowRepository::new());

    let queue = Queue::setup(config).await?;
    let job_producer = Arc::new(JobProducer::new(queue.clone()));

    let transport: Arc<dyn ChannelTransport> = match config.notification_gateway_url.clone() {
        Some(url) => Arc::new(GatewayTransport::new(
            url,
            config.notification_signing_key.clone(),
        )),
        None => {
            info!("No notification gateway configured; deliveries will be logged only");
            Arc::new(LogTransport)
        }
    };

    let scanner = Arc::new(ClamdScanService::new(
        config.clamav_host.clone(),
        config.clamav_port,
        config.clamav_timeout_ms,
    ));
    let media_fetcher = Arc::new(ObjectStoreFetcher::new(config.object_store_url.clone()));

    let app_state = AppState {
        notification_repository,
        media_repository,
        export_repository,
        window_repository,
        job_producer,
        directory: Arc::new(InMemoryDirectory::new()),
        roster: Arc::new(InMemoryRoster::new()),
        transport,
        scanner,
        media_fetcher,
        audit: AuditService::new(Arc::new(InMemoryAuditSink::new())),
        export_threshold: config.export_threshold,
    };

    Ok((app_state, queue))
}
