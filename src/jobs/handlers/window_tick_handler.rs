//! Recruitment-window scheduler, driven by a cron stream.
//!
//! Every tick flips windows whose boundary has passed: Scheduled to Open,
//! Open to Closed. Each flip writes an audit entry and enqueues a
//! club-scoped notification. Both side effects are supervised: a failure is
//! logged and never aborts the tick, so one bad window cannot stall the
//! scheduler.

use apalis::prelude::{Data, Error};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde_json::json;

use crate::{
    models::{AuditEntry, Channel, GroupKind, RecipientSpec, RecruitmentWindowModel, WindowState},
    repositories::Repository,
    services::{NewNotification, NotificationService},
    AppState,
};

/// One firing of the scheduler cron.
#[derive(Debug, Clone)]
pub struct WindowTick(DateTime<Utc>);

impl From<DateTime<Utc>> for WindowTick {
    fn from(t: DateTime<Utc>) -> Self {
        WindowTick(t)
    }
}

impl WindowTick {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }
}

pub async fn window_tick_handler(tick: WindowTick, state: Data<AppState>) -> Result<(), Error> {
    handle_tick(tick.timestamp(), &state).await;
    Ok(())
}

async fn handle_tick(now: DateTime<Utc>, state: &AppState) {
    match state.window_repository.list_due_to_open(now).await {
        Ok(windows) => {
            for window in windows {
                flip_window(
                    window,
                    WindowState::Open,
                    "recruitment:window_opened",
                    state,
                )
                .await;
            }
        }
        Err(e) => warn!("Failed to list windows due to open: {}", e),
    }

    match state.window_repository.list_due_to_close(now).await {
        Ok(windows) => {
            for window in windows {
                flip_window(
                    window,
                    WindowState::Closed,
                    "recruitment:window_closed",
                    state,
                )
                .await;
            }
        }
        Err(e) => warn!("Failed to list windows due to close: {}", e),
    }
}

async fn flip_window(
    mut window: RecruitmentWindowModel,
    to: WindowState,
    action: &str,
    state: &AppState,
) {
    let before = window.state;
    window.state = to;

    if let Err(e) = state
        .window_repository
        .update(window.id.clone(), window.clone())
        .await
    {
        warn!("Failed to update window '{}': {}", window.id, e);
        return;
    }
    info!(
        "Recruitment window '{}' moved from {} to {}",
        window.id, before, to
    );

    state
        .audit
        .record(
            AuditEntry::system(action, "recruitment_window", window.id.clone())
                .with_before(json!({ "state": before }))
                .with_after(json!({ "state": to })),
        )
        .await;

    let (title, message) = match to {
        WindowState::Open => (
            "Recruitment open",
            format!("Applications for {} are now open", window.role),
        ),
        _ => (
            "Recruitment closed",
            format!("Applications for {} are now closed", window.role),
        ),
    };

    let service = NotificationService::new(
        state.notification_repository.clone(),
        state.directory.clone(),
        state.job_producer.clone(),
    );
    let result = service
        .enqueue_notification(NewNotification {
            spec: RecipientSpec::Group {
                kind: GroupKind::Club,
                key: window.club_id.clone(),
            },
            channel: Channel::InApp,
            title: title.to_string(),
            message,
            data: json!({ "window_id": window.id, "role": window.role }),
            created_by: None,
            delay_ms: None,
        })
        .await;

    if let Err(e) = result {
        warn!(
            "Failed to enqueue notification for window '{}': {}",
            window.id, e
        );
    }
}
