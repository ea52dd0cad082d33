use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::{
        error::HttpError,
        feed::{PostFeedService, RawPostQuery, format_iso_date},
        repos::PostQueryFilter,
    },
    config::SiteSettings,
    infra::db::PostgresRepositories,
    presentation::views::{
        BrandView, FilterFormView, IndexTemplate, LayoutChrome, LayoutContext, ListingContext,
        NavigationLinkView, PageMetaView, PostTemplate, SearchContext, SearchTemplate,
        kind_options, render_not_found_response, render_template_response,
    },
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub feed: PostFeedService,
    pub db: Arc<PostgresRepositories>,
    pub site: SiteSettings,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/posts/{id}", get(post_detail))
        .route("/search", get(search))
        .route("/static/{*path}", get(crate::infra::assets::serve))
        .route("/_health/db", get(public_health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// Build the shared page chrome for the public surface.
pub fn site_chrome(site: &SiteSettings, active_path: &str) -> LayoutChrome {
    let navigation = [("Home", "/"), ("Search", "/search")]
        .into_iter()
        .map(|(label, href)| NavigationLinkView {
            label: label.to_string(),
            href: href.to_string(),
            is_active: href == active_path,
        })
        .collect();

    LayoutChrome {
        brand: BrandView {
            title: site.title.clone(),
            href: "/".to_string(),
        },
        navigation,
        footer_copy: site.footer_copy.clone(),
        meta: PageMetaView {
            title: site.title.clone(),
            description: site.description.clone(),
        },
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListingQuery {
    kind: Option<String>,
    title: Option<String>,
    author: Option<String>,
    created_after: Option<String>,
    page: Option<String>,
}

impl From<ListingQuery> for RawPostQuery {
    fn from(query: ListingQuery) -> Self {
        Self {
            kind: query.kind,
            title: query.title,
            author: query.author,
            created_after: query.created_after,
            page: query.page,
        }
    }
}

/// Echo the normalized filter back into form fields.
fn filter_form(filter: &PostQueryFilter) -> FilterFormView {
    FilterFormView {
        kind_options: kind_options(filter.kind.map(|kind| kind.as_str())),
        title: filter.title.clone().unwrap_or_default(),
        author: filter.author.clone().unwrap_or_default(),
        created_after: filter.created_after.map(format_iso_date).unwrap_or_default(),
    }
}

async fn index(State(state): State<HttpState>, Query(query): Query<ListingQuery>) -> Response {
    let raw = RawPostQuery::from(query);
    let chrome = site_chrome(&state.site, "/");

    match state.feed.page_context(&raw, "/").await {
        Ok(page) => {
            let content = ListingContext {
                heading: "Latest posts".to_string(),
                has_results: !page.cards.is_empty(),
                is_filtered: !page.filter.is_empty(),
                filter_form: filter_form(&page.filter),
                posts: page.cards,
                total_count: page.total_count,
                nav: page.nav,
            };
            let view = LayoutContext::new(chrome, content);
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn search(State(state): State<HttpState>, Query(query): Query<ListingQuery>) -> Response {
    let raw = RawPostQuery::from(query);
    let chrome = site_chrome(&state.site, "/search");
    let meta = PageMetaView {
        title: format!("Search — {}", state.site.title),
        description: state.site.description.clone(),
    };

    match state.feed.page_context(&raw, "/search").await {
        Ok(page) => {
            let content = SearchContext {
                has_results: !page.cards.is_empty(),
                form: filter_form(&page.filter),
                posts: page.cards,
                total_count: page.total_count,
                nav: page.nav,
            };
            let view = LayoutContext::new(chrome.with_meta(meta), content);
            render_template_response(SearchTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_detail(State(state): State<HttpState>, Path(id): Path<String>) -> Response {
    let chrome = site_chrome(&state.site, "");

    // A malformed id behaves like a missing post.
    let Ok(id) = Uuid::parse_str(&id) else {
        return render_not_found_response(chrome);
    };

    match state.feed.post_detail(id).await {
        Ok(Some(content)) => {
            let meta = PageMetaView {
                title: format!("{} — {}", content.title, state.site.title),
                description: state.site.description.clone(),
            };
            let view = LayoutContext::new(chrome.with_meta(meta), content);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}

async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(site_chrome(&state.site, ""))
}
