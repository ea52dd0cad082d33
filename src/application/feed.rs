//! Public listing, detail and search queries over the posts repository.

use std::sync::Arc;

use thiserror::Error;
use time::{Date, format_description::FormatItem, macros::format_description};
use url::form_urlencoded;
use uuid::Uuid;

use crate::application::pagination::{Page, Paginator};
use crate::application::repos::{PostQueryFilter, PostsRepo, RepoError};
use crate::domain::entities::PostRecord;
use crate::domain::types::PostKind;
use crate::presentation::views::{PageNav, PostCard, PostDetailContext};

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
pub const ISO_DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

const EXCERPT_MAX_CHARS: usize = 200;

/// Raw query-string parameters before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawPostQuery {
    pub kind: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub created_after: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// One resolved listing page: cards plus the navigation around them.
#[derive(Debug)]
pub struct FeedPage {
    pub cards: Vec<PostCard>,
    pub nav: PageNav,
    pub total_count: u64,
    pub filter: PostQueryFilter,
}

#[derive(Clone)]
pub struct PostFeedService {
    posts: Arc<dyn PostsRepo>,
    page_size: u64,
}

impl PostFeedService {
    pub fn new(posts: Arc<dyn PostsRepo>, page_size: u64) -> Self {
        Self { posts, page_size }
    }

    pub async fn page_context(
        &self,
        raw: &RawPostQuery,
        base_path: &str,
    ) -> Result<FeedPage, FeedError> {
        let filter = parse_filter(raw)?;

        let total_count = self.posts.count_posts(&filter).await?;
        let paginator = Paginator::new(total_count, self.page_size);
        let page = paginator.get_page(raw.page.as_deref());

        let records = self
            .posts
            .list_posts(&filter, page.offset, page.limit)
            .await?;

        let cards = records.iter().map(build_post_card).collect();
        let nav = build_page_nav(base_path, &filter, page);

        Ok(FeedPage {
            cards,
            nav,
            total_count,
            filter,
        })
    }

    pub async fn post_detail(&self, id: Uuid) -> Result<Option<PostDetailContext>, FeedError> {
        let Some(record) = self.posts.find_by_id(id).await? else {
            return Ok(None);
        };

        Ok(Some(build_post_detail(&record)))
    }
}

/// Normalize raw query parameters into lookup conditions.
///
/// Blank parameters are dropped; an unknown kind or an unparsable date is a
/// client error rather than silently matching nothing.
pub fn parse_filter(raw: &RawPostQuery) -> Result<PostQueryFilter, FeedError> {
    let kind = match normalize_param(raw.kind.as_deref()) {
        Some(value) => Some(
            PostKind::try_from(value.as_str())
                .map_err(|()| FeedError::InvalidFilter(format!("unknown post kind `{value}`")))?,
        ),
        None => None,
    };

    let created_after = match normalize_param(raw.created_after.as_deref()) {
        Some(value) => Some(Date::parse(&value, ISO_DATE_FORMAT).map_err(|err| {
            FeedError::InvalidFilter(format!("invalid created_after `{value}`: {err}"))
        })?),
        None => None,
    };

    Ok(PostQueryFilter {
        kind,
        title: normalize_param(raw.title.as_deref()),
        author: normalize_param(raw.author.as_deref()),
        created_after,
    })
}

fn normalize_param(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn build_post_card(record: &PostRecord) -> PostCard {
    let date = record.created_at.date();
    PostCard {
        id: record.id.to_string(),
        kind_key: record.kind.as_str().to_string(),
        kind_label: record.kind.label().to_string(),
        title: record.title.clone(),
        author: record.author.clone(),
        excerpt: excerpt_of(&record.body),
        published: format_human_date(date),
        iso_date: format_iso_date(date),
        href: format!("/posts/{}", record.id),
    }
}

pub fn build_post_detail(record: &PostRecord) -> PostDetailContext {
    let date = record.created_at.date();
    PostDetailContext {
        id: record.id.to_string(),
        kind_label: record.kind.label().to_string(),
        title: record.title.clone(),
        author: record.author.clone(),
        paragraphs: split_paragraphs(&record.body),
        published: format_human_date(date),
        iso_date: format_iso_date(date),
    }
}

/// Serialize active filter conditions back into query pairs, so page links
/// preserve the filter they were issued under.
pub fn filter_query_pairs(filter: &PostQueryFilter) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(kind) = filter.kind {
        pairs.push(("kind", kind.as_str().to_string()));
    }
    if let Some(title) = &filter.title {
        pairs.push(("title", title.clone()));
    }
    if let Some(author) = &filter.author {
        pairs.push(("author", author.clone()));
    }
    if let Some(date) = filter.created_after {
        pairs.push(("created_after", format_iso_date(date)));
    }
    pairs
}

fn page_href(base_path: &str, filter: &PostQueryFilter, page: u64) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in filter_query_pairs(filter) {
        serializer.append_pair(key, &value);
    }
    if page > 1 {
        serializer.append_pair("page", &page.to_string());
    }

    let query = serializer.finish();
    if query.is_empty() {
        base_path.to_string()
    } else {
        format!("{base_path}?{query}")
    }
}

pub fn build_page_nav(base_path: &str, filter: &PostQueryFilter, page: Page) -> PageNav {
    PageNav {
        current: page.number,
        total_pages: page.total_pages,
        previous_href: page
            .previous_number()
            .map(|n| page_href(base_path, filter, n)),
        next_href: page.next_number().map(|n| page_href(base_path, filter, n)),
    }
}

fn excerpt_of(body: &str) -> String {
    let first_block = body
        .split("\n\n")
        .map(str::trim)
        .find(|block| !block.is_empty())
        .unwrap_or("");

    let mut collapsed = String::with_capacity(first_block.len().min(EXCERPT_MAX_CHARS + 1));
    let mut last_was_space = false;
    for ch in first_block.chars() {
        if collapsed.chars().count() > EXCERPT_MAX_CHARS {
            break;
        }
        if ch.is_whitespace() {
            if !last_was_space && !collapsed.is_empty() {
                collapsed.push(' ');
            }
            last_was_space = true;
        } else {
            collapsed.push(ch);
            last_was_space = false;
        }
    }

    if collapsed.chars().count() > EXCERPT_MAX_CHARS {
        let truncated: String = collapsed.chars().take(EXCERPT_MAX_CHARS).collect();
        format!("{}…", truncated.trim_end())
    } else {
        collapsed
    }
}

fn split_paragraphs(body: &str) -> Vec<String> {
    body.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn format_human_date(date: Date) -> String {
    date.format(HUMAN_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}
