use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use newsdesk::application::repos::{
    AuditRepo, CreatePostParams, PostQueryFilter, PostsRepo, PostsWriteRepo, RepoError,
    UpdatePostParams,
};
use newsdesk::domain::entities::{AuditLogRecord, PostRecord};
use newsdesk::domain::types::PostKind;
use time::OffsetDateTime;
use uuid::Uuid;

/// In-memory stand-in for the Postgres repositories, mirroring their
/// filtering and ordering behavior.
#[derive(Default)]
pub struct InMemoryRepos {
    posts: Mutex<Vec<PostRecord>>,
    logs: Mutex<Vec<AuditLogRecord>>,
    read_failure: Mutex<Option<String>>,
}

impl InMemoryRepos {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every post read fail with a persistence error, simulating a
    /// database outage.
    pub fn fail_reads(&self, message: &str) {
        *self.read_failure.lock().unwrap() = Some(message.to_string());
    }

    fn check_reads(&self) -> Result<(), RepoError> {
        match self.read_failure.lock().unwrap().as_ref() {
            Some(message) => Err(RepoError::Persistence(message.clone())),
            None => Ok(()),
        }
    }

    pub fn seed_post(
        &self,
        kind: PostKind,
        title: &str,
        author: &str,
        body: &str,
        created_at: OffsetDateTime,
    ) -> PostRecord {
        let record = PostRecord {
            id: Uuid::new_v4(),
            kind,
            title: title.to_string(),
            author: author.to_string(),
            body: body.to_string(),
            created_at,
            updated_at: created_at,
        };
        self.posts.lock().unwrap().push(record.clone());
        record
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn audit_actions(&self) -> Vec<String> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .map(|log| log.action.clone())
            .collect()
    }

    fn matching(&self, filter: &PostQueryFilter) -> Vec<PostRecord> {
        let mut records: Vec<PostRecord> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|record| {
                filter.kind.is_none_or(|kind| record.kind == kind)
                    && filter.title.as_ref().is_none_or(|needle| {
                        record
                            .title
                            .to_lowercase()
                            .contains(&needle.to_lowercase())
                    })
                    && filter
                        .author
                        .as_ref()
                        .is_none_or(|author| &record.author == author)
                    && filter
                        .created_after
                        .is_none_or(|date| record.created_at >= date.midnight().assume_utc())
            })
            .cloned()
            .collect();

        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        records
    }
}

#[async_trait]
impl PostsRepo for InMemoryRepos {
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        self.check_reads()?;
        Ok(self
            .matching(filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_posts(&self, filter: &PostQueryFilter) -> Result<u64, RepoError> {
        self.check_reads()?;
        Ok(self.matching(filter).len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        self.check_reads()?;
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryRepos {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let record = PostRecord {
            id: Uuid::new_v4(),
            kind: params.kind,
            title: params.title,
            author: params.author,
            body: params.body,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let record = posts
            .iter_mut()
            .find(|record| record.id == params.id)
            .ok_or(RepoError::NotFound)?;

        record.kind = params.kind;
        record.title = params.title;
        record.author = params.author;
        record.body = params.body;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|record| record.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AuditRepo for InMemoryRepos {
    async fn append_log(&self, record: AuditLogRecord) -> Result<(), RepoError> {
        self.logs.lock().unwrap().push(record);
        Ok(())
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<AuditLogRecord>, RepoError> {
        let mut logs = self.logs.lock().unwrap().clone();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        logs.truncate(limit as usize);
        Ok(logs)
    }
}
