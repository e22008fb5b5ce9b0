//! Recruitment window model, driven by the cron scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// State of a recruitment window. The scheduler flips
/// `Scheduled -> Open` once `opens_at` passes and `Open -> Closed` once
/// `closes_at` passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WindowState {
    Scheduled,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitmentWindowModel {
    pub id: String,
    pub club_id: String,
    /// Role the recruitment is for, used in notification copy.
    pub role: String,
    pub state: WindowState,
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

impl RecruitmentWindowModel {
    pub fn new(
        club_id: impl Into<String>,
        role: impl Into<String>,
        opens_at: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            club_id: club_id.into(),
            role: role.into(),
            state: WindowState::Scheduled,
            opens_at,
            closes_at,
        }
    }
}
