mod common;

use std::sync::Arc;

use common::InMemoryRepos;
use newsdesk::application::editorial::audit::AuditService;
use newsdesk::application::editorial::posts::{
    CreatePostCommand, EditorialPostError, EditorialPostService, UpdatePostCommand,
};
use newsdesk::application::repos::{AuditRepo, PostsRepo, PostsWriteRepo};
use newsdesk::domain::types::PostKind;
use time::macros::datetime;
use uuid::Uuid;

fn service(repos: &Arc<InMemoryRepos>) -> EditorialPostService {
    let audit = AuditService::new(Arc::clone(repos) as Arc<dyn AuditRepo>);
    EditorialPostService::new(
        Arc::clone(repos) as Arc<dyn PostsRepo>,
        Arc::clone(repos) as Arc<dyn PostsWriteRepo>,
        audit,
    )
}

fn create_command(kind: PostKind, title: &str) -> CreatePostCommand {
    CreatePostCommand {
        kind,
        title: title.to_string(),
        author: "alice".to_string(),
        body: "Body copy.".to_string(),
    }
}

#[tokio::test]
async fn create_trims_fields_and_records_audit() {
    let repos = InMemoryRepos::new();
    let editorial = service(&repos);

    let record = editorial
        .create_post(
            "editor",
            CreatePostCommand {
                kind: PostKind::News,
                title: "  Breaking story  ".to_string(),
                author: " alice ".to_string(),
                body: "  Something happened.  ".to_string(),
            },
        )
        .await
        .expect("create post");

    assert_eq!(record.kind, PostKind::News);
    assert_eq!(record.title, "Breaking story");
    assert_eq!(record.author, "alice");
    assert_eq!(record.body, "Something happened.");
    assert_eq!(repos.audit_actions(), ["post.create"]);
}

#[tokio::test]
async fn create_rejects_blank_required_fields() {
    let repos = InMemoryRepos::new();
    let editorial = service(&repos);

    let err = editorial
        .create_post(
            "editor",
            CreatePostCommand {
                kind: PostKind::Article,
                title: "   ".to_string(),
                author: "alice".to_string(),
                body: "body".to_string(),
            },
        )
        .await
        .expect_err("blank title");

    assert!(matches!(err, EditorialPostError::EmptyField("title")));
    assert_eq!(repos.post_count(), 0);
    assert!(repos.audit_actions().is_empty());
}

#[tokio::test]
async fn update_replaces_fields_and_records_audit() {
    let repos = InMemoryRepos::new();
    let editorial = service(&repos);

    let created = editorial
        .create_post("editor", create_command(PostKind::News, "Original"))
        .await
        .expect("create post");

    let updated = editorial
        .update_post(
            "editor",
            UpdatePostCommand {
                id: created.id,
                kind: PostKind::News,
                title: "Corrected".to_string(),
                author: "alice".to_string(),
                body: "Corrected body.".to_string(),
            },
        )
        .await
        .expect("update post");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Corrected");
    assert_eq!(repos.audit_actions(), ["post.create", "post.update"]);
}

#[tokio::test]
async fn update_of_missing_post_is_not_found() {
    let repos = InMemoryRepos::new();
    let editorial = service(&repos);

    let err = editorial
        .update_post(
            "editor",
            UpdatePostCommand {
                id: Uuid::new_v4(),
                kind: PostKind::News,
                title: "Ghost".to_string(),
                author: "alice".to_string(),
                body: "body".to_string(),
            },
        )
        .await
        .expect_err("missing post");

    assert!(matches!(err, EditorialPostError::NotFound));
}

#[tokio::test]
async fn delete_removes_post_and_records_audit() {
    let repos = InMemoryRepos::new();
    let editorial = service(&repos);

    let seeded = repos.seed_post(
        PostKind::Article,
        "Short lived",
        "bob",
        "body",
        datetime!(2026-04-01 12:00 UTC),
    );

    let deleted = editorial
        .delete_post("editor", seeded.id)
        .await
        .expect("delete post");

    assert_eq!(deleted.id, seeded.id);
    assert_eq!(repos.post_count(), 0);
    assert_eq!(repos.audit_actions(), ["post.delete"]);

    let err = editorial
        .delete_post("editor", seeded.id)
        .await
        .expect_err("second delete");
    assert!(matches!(err, EditorialPostError::NotFound));
}

#[tokio::test]
async fn load_post_requires_matching_kind() {
    let repos = InMemoryRepos::new();
    let editorial = service(&repos);

    let seeded = repos.seed_post(
        PostKind::News,
        "Kind bound",
        "alice",
        "body",
        datetime!(2026-04-02 09:00 UTC),
    );

    let found = editorial
        .load_post(seeded.id, PostKind::News)
        .await
        .expect("load as news");
    assert_eq!(found.map(|record| record.id), Some(seeded.id));

    let cross_kind = editorial
        .load_post(seeded.id, PostKind::Article)
        .await
        .expect("load as article");
    assert!(cross_kind.is_none());
}

#[tokio::test]
async fn load_post_surfaces_repository_failures() {
    let repos = InMemoryRepos::new();
    let editorial = service(&repos);
    repos.fail_reads("connection reset");

    let err = editorial
        .load_post(Uuid::new_v4(), PostKind::News)
        .await
        .expect_err("poisoned read");
    assert!(matches!(err, EditorialPostError::Repo(_)));
}

#[tokio::test]
async fn audit_trail_is_readable_most_recent_first() {
    let repos = InMemoryRepos::new();
    let editorial = service(&repos);
    let audit = AuditService::new(Arc::clone(&repos) as Arc<dyn AuditRepo>);

    let record = editorial
        .create_post("editor", create_command(PostKind::News, "First"))
        .await
        .expect("create post");
    editorial
        .delete_post("editor", record.id)
        .await
        .expect("delete post");

    let recent = audit.list_recent(10).await.expect("recent audit logs");
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|log| log.actor == "editor"));
    assert!(recent.iter().all(|log| log.entity_type == "post"));
}
