//! Audit sink port and the best-effort recording service.

use crate::models::AuditEntry;
use async_trait::async_trait;
use log::warn;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit sink error: {0}")]
    SinkError(String),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_event(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn log_event(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries.lock().await.push(entry);
        Ok(())
    }
}

/// Records audit events without ever failing the caller. Sink failures are
/// logged and dropped; a lost audit line must not fail a job.
#[derive(Clone)]
pub struct AuditService {
    sink: Arc<dyn AuditSink>,
}

impl AuditService {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub async fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.sink.log_event(entry).await {
            warn!("Failed to record audit event: {}", e);
        }
    }
}
