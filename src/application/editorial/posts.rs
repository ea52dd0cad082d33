//! Create/update/delete commands for posts, with validation and auditing.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::application::editorial::audit::AuditService;
use crate::application::repos::{
    CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;
use crate::domain::types::PostKind;

#[derive(Debug, Error)]
pub enum EditorialPostError {
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("post not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreatePostCommand {
    pub kind: PostKind,
    pub title: String,
    pub author: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct UpdatePostCommand {
    pub id: Uuid,
    pub kind: PostKind,
    pub title: String,
    pub author: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
struct PostSnapshot<'a> {
    kind: PostKind,
    title: &'a str,
    author: &'a str,
}

#[derive(Clone)]
pub struct EditorialPostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    audit: AuditService,
}

impl EditorialPostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        audit: AuditService,
    ) -> Self {
        Self {
            reader,
            writer,
            audit,
        }
    }

    /// Load a post for an editorial page. The kind is part of the route, so
    /// a record whose stored kind differs is treated as absent.
    pub async fn load_post(
        &self,
        id: Uuid,
        kind: PostKind,
    ) -> Result<Option<PostRecord>, EditorialPostError> {
        let record = self.reader.find_by_id(id).await?;
        Ok(record.filter(|record| record.kind == kind))
    }

    pub async fn create_post(
        &self,
        actor: &str,
        command: CreatePostCommand,
    ) -> Result<PostRecord, EditorialPostError> {
        ensure_non_empty(&command.title, "title")?;
        ensure_non_empty(&command.author, "author")?;
        ensure_non_empty(&command.body, "body")?;

        let params = CreatePostParams {
            kind: command.kind,
            title: command.title.trim().to_string(),
            author: command.author.trim().to_string(),
            body: command.body.trim().to_string(),
        };

        let post = self.writer.create_post(params).await?;

        self.record_audit(actor, "post.create", &post).await?;

        Ok(post)
    }

    pub async fn update_post(
        &self,
        actor: &str,
        command: UpdatePostCommand,
    ) -> Result<PostRecord, EditorialPostError> {
        ensure_non_empty(&command.title, "title")?;
        ensure_non_empty(&command.author, "author")?;
        ensure_non_empty(&command.body, "body")?;

        if self.reader.find_by_id(command.id).await?.is_none() {
            return Err(EditorialPostError::NotFound);
        }

        let params = UpdatePostParams {
            id: command.id,
            kind: command.kind,
            title: command.title.trim().to_string(),
            author: command.author.trim().to_string(),
            body: command.body.trim().to_string(),
        };

        let post = self.writer.update_post(params).await.map_err(|err| {
            if matches!(err, RepoError::NotFound) {
                EditorialPostError::NotFound
            } else {
                EditorialPostError::Repo(err)
            }
        })?;

        self.record_audit(actor, "post.update", &post).await?;

        Ok(post)
    }

    pub async fn delete_post(&self, actor: &str, id: Uuid) -> Result<PostRecord, EditorialPostError> {
        let Some(post) = self.reader.find_by_id(id).await? else {
            return Err(EditorialPostError::NotFound);
        };

        self.writer.delete_post(id).await.map_err(|err| {
            if matches!(err, RepoError::NotFound) {
                EditorialPostError::NotFound
            } else {
                EditorialPostError::Repo(err)
            }
        })?;

        self.record_audit(actor, "post.delete", &post).await?;

        Ok(post)
    }

    async fn record_audit(
        &self,
        actor: &str,
        action: &str,
        post: &PostRecord,
    ) -> Result<(), RepoError> {
        let snapshot = PostSnapshot {
            kind: post.kind,
            title: post.title.as_str(),
            author: post.author.as_str(),
        };
        let entity_id = post.id.to_string();
        self.audit
            .record(actor, action, "post", Some(entity_id.as_str()), Some(&snapshot))
            .await
    }
}

fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), EditorialPostError> {
    if value.trim().is_empty() {
        return Err(EditorialPostError::EmptyField(field));
    }
    Ok(())
}
