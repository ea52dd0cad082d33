//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::domain::entities::{AuditLogRecord, PostRecord};
use crate::domain::types::PostKind;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Declarative mapping of query-string parameters to lookup conditions.
///
/// Blank or whitespace-only parameters never reach this struct; callers
/// normalize them to `None` first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostQueryFilter {
    pub kind: Option<PostKind>,
    /// Case-insensitive substring match against the title.
    pub title: Option<String>,
    /// Exact username match.
    pub author: Option<String>,
    /// Lower bound (inclusive) on the creation date.
    pub created_after: Option<Date>,
}

impl PostQueryFilter {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.title.is_none()
            && self.author.is_none()
            && self.created_after.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub kind: PostKind,
    pub title: String,
    pub author: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub kind: PostKind,
    pub title: String,
    pub author: String,
    pub body: String,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// List posts matching `filter`, newest first, at the given offset window.
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_posts(&self, filter: &PostQueryFilter) -> Result<u64, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    /// Returns `NotFound` when no row was deleted.
    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait AuditRepo: Send + Sync {
    async fn append_log(&self, record: AuditLogRecord) -> Result<(), RepoError>;

    async fn list_recent(&self, limit: u64) -> Result<Vec<AuditLogRecord>, RepoError>;
}
