use std::sync::Arc;

use crate::{
    jobs::JobProducerTrait,
    repositories::{
        InMemoryExportRepository, InMemoryMediaRepository, InMemoryNotificationRepository,
        InMemoryRecruitmentWindowRepository,
    },
    services::{
        AuditService, ChannelTransport, DirectoryPort, ExportService, MediaFetcher, RosterPort,
        ScanService,
    },
};

/// Component bundle constructed once at startup and injected into workers.
/// External collaborators (directory, roster, transport, scanner, fetcher,
/// audit sink) are held behind trait objects so tests can substitute mocks.
#[derive(Clone)]
pub struct AppState {
    pub notification_repository: Arc<InMemoryNotificationRepository>,
    pub media_repository: Arc<InMemoryMediaRepository>,
    pub export_repository: Arc<InMemoryExportRepository>,
    pub window_repository: Arc<InMemoryRecruitmentWindowRepository>,
    pub job_producer: Arc<dyn JobProducerTrait>,
    pub directory: Arc<dyn DirectoryPort>,
    pub roster: Arc<dyn RosterPort>,
    pub transport: Arc<dyn ChannelTransport>,
    pub scanner: Arc<dyn ScanService>,
    pub media_fetcher: Arc<dyn MediaFetcher>,
    pub audit: AuditService,
    /// Record count at or above which exports are generated asynchronously.
    pub export_threshold: usize,
}

impl AppState {
    pub fn notification_repository(&self) -> Arc<InMemoryNotificationRepository> {
        self.notification_repository.clone()
    }

    pub fn media_repository(&self) -> Arc<InMemoryMediaRepository> {
        self.media_repository.clone()
    }

    pub fn job_producer(&self) -> Arc<dyn JobProducerTrait> {
        self.job_producer.clone()
    }

    /// Export producer wired with the configured async threshold.
    pub fn export_service(&self) -> ExportService {
        ExportService::new(
            self.export_repository.clone(),
            self.roster.clone(),
            self.job_producer.clone(),
            self.export_threshold,
        )
    }
}
