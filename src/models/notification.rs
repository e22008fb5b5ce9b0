//! Notification record model.
//!
//! A notification is either *direct* (addressed to one concrete member) or
//! *meta* (carrying an unresolved audience specification that a worker
//! expands later). The [`Audience`] enum makes the recipient-XOR-group
//! invariant unrepresentable instead of relying on two nullable fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// Delivery channel for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Channel {
    InApp,
    Email,
    Push,
    Sms,
}

/// Group kinds an audience specification can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GroupKind {
    /// Core members of a club.
    Club,
}

/// Who a delivery request is addressed to.
///
/// Replaces the duck-typed recipient shapes of the upstream API (single id,
/// id list, `{club: id}`, `"all"`) with an exhaustive tagged variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecipientSpec {
    /// A bounded, explicit list of member ids.
    Direct { ids: Vec<String> },
    /// A group filter resolved through the member directory.
    Group { kind: GroupKind, key: String },
    /// The entire member population. Always resolved lazily by a worker.
    Everyone,
}

/// Audience of a stored notification row: exactly one of a concrete member
/// or a pending (unresolved) specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Audience {
    /// Direct notification for a single member.
    Member { user_id: String },
    /// Meta notification; the spec is expanded by the notification worker.
    Pending { spec: RecipientSpec },
}

impl Audience {
    pub fn is_meta(&self) -> bool {
        matches!(self, Audience::Pending { .. })
    }
}

/// Lifecycle status of a notification row.
///
/// `Pending` is the only non-terminal status. Direct rows end in `Sent` or
/// `Failed`; meta rows end in `Expanded` (fan-out completed) or `Failed`.
/// `Expanded` is deliberately distinct from `Sent`: completing fan-out says
/// nothing about delivery to any recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Expanded,
    Failed,
}

impl NotificationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NotificationStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRepoModel {
    pub id: String,
    pub audience: Audience,
    pub channel: Channel,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub status: NotificationStatus,
    /// Delivery attempts observed so far. Mirrors the broker's attempt count
    /// as seen by the worker holding the lease; monotonically non-decreasing.
    pub attempts: u32,
    pub last_error: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Broker task id of the job correlated with this row, for tracing.
    pub job_id: Option<String>,
}

impl NotificationRepoModel {
    /// New pending direct notification for a single member.
    pub fn new_direct(
        user_id: impl Into<String>,
        channel: Channel,
        title: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
        created_by: Option<String>,
    ) -> Self {
        Self::new(
            Audience::Member {
                user_id: user_id.into(),
            },
            channel,
            title,
            message,
            data,
            created_by,
        )
    }

    /// New pending meta notification carrying the original specification.
    pub fn new_meta(
        spec: RecipientSpec,
        channel: Channel,
        title: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
        created_by: Option<String>,
    ) -> Self {
        Self::new(
            Audience::Pending { spec },
            channel,
            title,
            message,
            data,
            created_by,
        )
    }

    fn new(
        audience: Audience,
        channel: Channel,
        title: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
        created_by: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            audience,
            channel,
            title: title.into(),
            message: message.into(),
            data,
            status: NotificationStatus::Pending,
            attempts: 0,
            last_error: String::new(),
            sent_at: None,
            created_by,
            created_at: Utc::now(),
            job_id: None,
        }
    }
}
