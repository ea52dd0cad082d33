mod common;

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use common::InMemoryRepos;
use newsdesk::application::editorial::audit::AuditService;
use newsdesk::application::editorial::posts::EditorialPostService;
use newsdesk::application::feed::PostFeedService;
use newsdesk::application::repos::{AuditRepo, PostsRepo, PostsWriteRepo};
use newsdesk::config::SiteSettings;
use newsdesk::domain::types::PostKind;
use newsdesk::infra::db::PostgresRepositories;
use newsdesk::infra::http::{EditorialState, build_editorial_router};
use sqlx::postgres::PgPoolOptions;
use time::macros::datetime;
use tower::ServiceExt;
use uuid::Uuid;

fn site_settings() -> SiteSettings {
    SiteSettings {
        title: "Newsdesk".to_string(),
        description: "Local news and longer reads.".to_string(),
        footer_copy: "Newsdesk".to_string(),
        page_size: NonZeroU32::new(10).expect("page size"),
    }
}

/// Build the editorial router on top of the in-memory repositories. The
/// lazy pool never connects; only the database health route would touch it.
fn editorial_app(repos: &Arc<InMemoryRepos>) -> Router {
    let reader: Arc<dyn PostsRepo> = Arc::clone(repos) as Arc<dyn PostsRepo>;
    let writer: Arc<dyn PostsWriteRepo> = Arc::clone(repos) as Arc<dyn PostsWriteRepo>;
    let audit = AuditService::new(Arc::clone(repos) as Arc<dyn AuditRepo>);

    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/newsdesk_unused")
        .expect("lazy pool");

    build_editorial_router(EditorialState {
        posts: EditorialPostService::new(Arc::clone(&reader), writer, audit.clone()),
        feed: PostFeedService::new(reader, 10),
        audit,
        db: Arc::new(PostgresRepositories::new(pool)),
        site: site_settings(),
    })
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn created_post_redirects_to_a_page_this_listener_serves() {
    let repos = InMemoryRepos::new();
    let app = editorial_app(&repos);

    let response = app
        .clone()
        .oneshot(form_request(
            "/news/create",
            "title=Launch+day&author=alice&body=Details+inside.",
        ))
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect location")
        .to_string();
    assert!(
        location.starts_with("/posts/"),
        "unexpected location: {location}"
    );

    let response = app
        .oneshot(get_request(&location))
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Launch day"));
}

#[tokio::test]
async fn edit_form_under_mismatched_kind_is_not_found() {
    let repos = InMemoryRepos::new();
    let seeded = repos.seed_post(
        PostKind::News,
        "News only",
        "alice",
        "body",
        datetime!(2026-04-03 08:00 UTC),
    );
    let app = editorial_app(&repos);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/articles/{}/edit", seeded.id)))
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get_request(&format!("/news/{}/edit", seeded.id)))
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn repository_failure_surfaces_as_server_error() {
    let repos = InMemoryRepos::new();
    repos.fail_reads("connection reset");
    let app = editorial_app(&repos);

    let response = app
        .oneshot(get_request(&format!("/news/{}/edit", Uuid::new_v4())))
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn index_shows_recent_activity() {
    let repos = InMemoryRepos::new();
    let app = editorial_app(&repos);

    let response = app
        .clone()
        .oneshot(form_request(
            "/news/create",
            "title=Audited&author=alice&body=Body+copy.",
        ))
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .oneshot(get_request("/"))
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_text(response).await;
    assert!(page.contains("Recent activity"));
    assert!(page.contains("post.create"));
}
