mod common;

use std::sync::Arc;

use common::InMemoryRepos;
use newsdesk::application::feed::{FeedError, PostFeedService, RawPostQuery};
use newsdesk::application::repos::PostsRepo;
use newsdesk::domain::types::PostKind;
use time::macros::datetime;

fn service(repos: &Arc<InMemoryRepos>, page_size: u64) -> PostFeedService {
    PostFeedService::new(Arc::clone(repos) as Arc<dyn PostsRepo>, page_size)
}

fn query(pairs: &[(&str, &str)]) -> RawPostQuery {
    let mut raw = RawPostQuery::default();
    for (key, value) in pairs {
        let value = Some(value.to_string());
        match *key {
            "kind" => raw.kind = value,
            "title" => raw.title = value,
            "author" => raw.author = value,
            "created_after" => raw.created_after = value,
            "page" => raw.page = value,
            other => panic!("unknown query key {other}"),
        }
    }
    raw
}

#[tokio::test]
async fn listing_orders_newest_first() {
    let repos = InMemoryRepos::new();
    repos.seed_post(
        PostKind::News,
        "Older",
        "alice",
        "body",
        datetime!(2026-01-01 09:00 UTC),
    );
    repos.seed_post(
        PostKind::Article,
        "Newer",
        "bob",
        "body",
        datetime!(2026-02-01 09:00 UTC),
    );

    let page = service(&repos, 10)
        .page_context(&RawPostQuery::default(), "/")
        .await
        .expect("listing");

    let titles: Vec<&str> = page.cards.iter().map(|card| card.title.as_str()).collect();
    assert_eq!(titles, ["Newer", "Older"]);
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn listing_paginates_and_links_pages() {
    let repos = InMemoryRepos::new();
    for day in 1..=25u8 {
        repos.seed_post(
            PostKind::News,
            &format!("Post {day}"),
            "alice",
            "body",
            datetime!(2026-01-01 00:00 UTC) + time::Duration::days(day.into()),
        );
    }

    let feed = service(&repos, 10);

    let first = feed
        .page_context(&RawPostQuery::default(), "/")
        .await
        .expect("first page");
    assert_eq!(first.cards.len(), 10);
    assert_eq!(first.nav.current, 1);
    assert_eq!(first.nav.total_pages, 3);
    assert!(first.nav.previous_href.is_none());
    assert_eq!(first.nav.next_href.as_deref(), Some("/?page=2"));

    let last = feed
        .page_context(&query(&[("page", "3")]), "/")
        .await
        .expect("last page");
    assert_eq!(last.cards.len(), 5);
    assert_eq!(last.nav.previous_href.as_deref(), Some("/?page=2"));
    assert!(last.nav.next_href.is_none());
}

#[tokio::test]
async fn out_of_range_pages_are_coerced() {
    let repos = InMemoryRepos::new();
    for day in 1..=15u8 {
        repos.seed_post(
            PostKind::News,
            &format!("Post {day}"),
            "alice",
            "body",
            datetime!(2026-01-01 00:00 UTC) + time::Duration::days(day.into()),
        );
    }

    let feed = service(&repos, 10);

    // Garbage page numbers land on the first page.
    let garbage = feed
        .page_context(&query(&[("page", "banana")]), "/")
        .await
        .expect("garbage page");
    assert_eq!(garbage.nav.current, 1);

    // Overflow lands on the last page.
    let overflow = feed
        .page_context(&query(&[("page", "99")]), "/")
        .await
        .expect("overflow page");
    assert_eq!(overflow.nav.current, 2);
    assert_eq!(overflow.cards.len(), 5);
}

#[tokio::test]
async fn empty_result_set_is_one_empty_page() {
    let repos = InMemoryRepos::new();
    let page = service(&repos, 10)
        .page_context(&RawPostQuery::default(), "/")
        .await
        .expect("empty listing");

    assert!(page.cards.is_empty());
    assert_eq!(page.nav.current, 1);
    assert_eq!(page.nav.total_pages, 1);
}

#[tokio::test]
async fn filters_combine_and_carry_into_page_links() {
    let repos = InMemoryRepos::new();
    repos.seed_post(
        PostKind::News,
        "Rust 2026 released",
        "alice",
        "body",
        datetime!(2026-03-01 09:00 UTC),
    );
    repos.seed_post(
        PostKind::Article,
        "Why Rust endures",
        "alice",
        "body",
        datetime!(2026-03-02 09:00 UTC),
    );
    repos.seed_post(
        PostKind::Article,
        "Rust in production",
        "bob",
        "body",
        datetime!(2026-01-15 09:00 UTC),
    );

    let feed = service(&repos, 1);

    let page = feed
        .page_context(
            &query(&[
                ("kind", "article"),
                ("title", "rust"),
                ("author", "alice"),
                ("created_after", "2026-02-01"),
            ]),
            "/",
        )
        .await
        .expect("filtered listing");

    assert_eq!(page.total_count, 1);
    assert_eq!(page.cards[0].title, "Why Rust endures");
}

#[tokio::test]
async fn author_filter_is_exact_match() {
    let repos = InMemoryRepos::new();
    repos.seed_post(
        PostKind::News,
        "One",
        "alice",
        "body",
        datetime!(2026-03-01 09:00 UTC),
    );
    repos.seed_post(
        PostKind::News,
        "Two",
        "alice-b",
        "body",
        datetime!(2026-03-02 09:00 UTC),
    );

    let page = service(&repos, 10)
        .page_context(&query(&[("author", "alice")]), "/")
        .await
        .expect("author listing");

    assert_eq!(page.total_count, 1);
    assert_eq!(page.cards[0].author, "alice");
}

#[tokio::test]
async fn unknown_kind_is_a_filter_error() {
    let repos = InMemoryRepos::new();
    let err = service(&repos, 10)
        .page_context(&query(&[("kind", "podcast")]), "/")
        .await
        .expect_err("unknown kind");

    assert!(matches!(err, FeedError::InvalidFilter(_)));
}

#[tokio::test]
async fn detail_resolves_by_id() {
    let repos = InMemoryRepos::new();
    let record = repos.seed_post(
        PostKind::Article,
        "Deep dive",
        "alice",
        "first paragraph\n\nsecond paragraph",
        datetime!(2026-03-01 09:00 UTC),
    );

    let feed = service(&repos, 10);

    let detail = feed
        .post_detail(record.id)
        .await
        .expect("detail query")
        .expect("post exists");
    assert_eq!(detail.title, "Deep dive");
    assert_eq!(detail.paragraphs.len(), 2);

    let missing = feed
        .post_detail(uuid::Uuid::new_v4())
        .await
        .expect("detail query");
    assert!(missing.is_none());
}
