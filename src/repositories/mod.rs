//! # Repository Module
//!
//! Implements the record stores for the job core using the Repository
//! pattern. All stores are in-memory `Mutex`-protected maps; workers mutate
//! records through single read-modify-write operations while holding the
//! job's lease, which is the only exclusion mechanism the design relies on.

use crate::models::{PaginationQuery, RepositoryError};
use async_trait::async_trait;

mod notification;
pub use notification::*;

mod media;
pub use media::*;

mod export;
pub use export::*;

mod recruitment_window;
pub use recruitment_window::*;

#[derive(Debug)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

#[async_trait]
pub trait Repository<T, ID> {
    async fn create(&self, entity: T) -> Result<T, RepositoryError>;
    async fn get_by_id(&self, id: ID) -> Result<T, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<T>, RepositoryError>;
    async fn list_paginated(
        &self,
        query: PaginationQuery,
    ) -> Result<PaginatedResult<T>, RepositoryError>;
    async fn update(&self, id: ID, entity: T) -> Result<T, RepositoryError>;
    async fn delete_by_id(&self, id: ID) -> Result<(), RepositoryError>;
    async fn count(&self) -> Result<usize, RepositoryError>;
}
