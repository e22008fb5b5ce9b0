//! Member directory port.
//!
//! Recipient resolution and transport target lookup go through this port;
//! the membership model itself lives outside the job core.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// A member as seen by the job core: just enough to address a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub id: String,
    pub name: String,
    /// Missing for members who never verified an address.
    pub email: Option<String>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirectoryPort: Send + Sync {
    async fn find_member(&self, user_id: &str) -> Result<Option<MemberRecord>, DirectoryError>;

    /// Ids of the entire member population.
    async fn list_member_ids(&self) -> Result<Vec<String>, DirectoryError>;

    /// Ids of the core members of a club.
    async fn club_core_members(&self, club_id: &str) -> Result<Vec<String>, DirectoryError>;
}

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    members: Mutex<HashMap<String, MemberRecord>>,
    club_rosters: Mutex<HashMap<String, Vec<String>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_member(&self, member: MemberRecord) {
        self.members.lock().await.insert(member.id.clone(), member);
    }

    pub async fn set_club_core_members(&self, club_id: impl Into<String>, ids: Vec<String>) {
        self.club_rosters.lock().await.insert(club_id.into(), ids);
    }
}

#[async_trait]
impl DirectoryPort for InMemoryDirectory {
    async fn find_member(&self, user_id: &str) -> Result<Option<MemberRecord>, DirectoryError> {
        Ok(self.members.lock().await.get(user_id).cloned())
    }

    async fn list_member_ids(&self) -> Result<Vec<String>, DirectoryError> {
        let mut ids: Vec<String> = self.members.lock().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn club_core_members(&self, club_id: &str) -> Result<Vec<String>, DirectoryError> {
        Ok(self
            .club_rosters
            .lock()
            .await
            .get(club_id)
            .cloned()
            .unwrap_or_default())
    }
}
