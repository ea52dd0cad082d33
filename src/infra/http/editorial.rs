//! Editorial surface: create, edit and delete posts.
//!
//! Served on a separate listener so the mutating routes are never exposed on
//! the public address.

use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use metrics::counter;
use serde::Deserialize;
use time::{format_description::FormatItem, macros::format_description};
use uuid::Uuid;

use crate::{
    application::{
        editorial::{
            audit::AuditService,
            posts::{
                CreatePostCommand, EditorialPostError, EditorialPostService, UpdatePostCommand,
            },
        },
        error::{HttpError, repo_error_to_http},
        feed::{PostFeedService, RawPostQuery},
    },
    config::SiteSettings,
    domain::{
        entities::{AuditLogRecord, PostRecord},
        types::PostKind,
    },
    infra::db::PostgresRepositories,
    presentation::{
        editorial::views::{
            AuditEntryView, DeleteConfirmTemplate, DeleteConfirmView, EditorialIndexTemplate,
            EditorialIndexView, EditorialRowView, PostFormTemplate, PostFormView,
        },
        views::{
            BrandView, LayoutChrome, LayoutContext, NavigationLinkView, PageMetaView, PostTemplate,
            render_not_found_response, render_template_response,
        },
    },
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

const EDITOR_ACTOR: &str = "editor";
const RECENT_ACTIVITY_LIMIT: u64 = 5;
const ACTIVITY_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute] UTC");

#[derive(Clone)]
pub struct EditorialState {
    pub posts: EditorialPostService,
    pub feed: PostFeedService,
    pub audit: AuditService,
    pub db: Arc<PostgresRepositories>,
    pub site: SiteSettings,
}

pub fn build_editorial_router(state: EditorialState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/posts/{id}", get(post_detail))
        .route("/news/create", get(news_create_form).post(news_create))
        .route(
            "/articles/create",
            get(article_create_form).post(article_create),
        )
        .route("/news/{id}/edit", get(news_edit_form).post(news_edit))
        .route(
            "/articles/{id}/edit",
            get(article_edit_form).post(article_edit),
        )
        .route(
            "/news/{id}/delete",
            get(news_delete_confirm).post(news_delete),
        )
        .route(
            "/articles/{id}/delete",
            get(article_delete_confirm).post(article_delete),
        )
        .route("/static/{*path}", get(crate::infra::assets::serve))
        .route("/_health/db", get(editorial_health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

fn editorial_chrome(site: &SiteSettings, active_path: &str) -> LayoutChrome {
    let navigation = [("Dashboard", "/")]
        .into_iter()
        .map(|(label, href)| NavigationLinkView {
            label: label.to_string(),
            href: href.to_string(),
            is_active: href == active_path,
        })
        .collect();

    let title = format!("{} Editorial", site.title);
    LayoutChrome {
        brand: BrandView {
            title: title.clone(),
            href: "/".to_string(),
        },
        navigation,
        footer_copy: site.footer_copy.clone(),
        meta: PageMetaView {
            title,
            description: site.description.clone(),
        },
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IndexQuery {
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostForm {
    title: String,
    author: String,
    body: String,
}

fn post_paths(kind: PostKind, id: Uuid) -> (String, String, String) {
    let segment = kind.path_segment();
    (
        format!("/posts/{id}"),
        format!("/{segment}/{id}/edit"),
        format!("/{segment}/{id}/delete"),
    )
}

async fn index(State(state): State<EditorialState>, Query(query): Query<IndexQuery>) -> Response {
    let raw = RawPostQuery {
        page: query.page,
        ..RawPostQuery::default()
    };
    let chrome = editorial_chrome(&state.site, "/");

    let recent_activity = match state.audit.list_recent(RECENT_ACTIVITY_LIMIT).await {
        Ok(logs) => logs.iter().map(audit_entry_view).collect(),
        Err(err) => {
            return repo_error_to_http("infra::http::editorial::index", err).into_response();
        }
    };

    match state.feed.page_context(&raw, "/").await {
        Ok(page) => {
            let rows: Vec<EditorialRowView> = page
                .cards
                .iter()
                .map(|card| {
                    let kind = PostKind::try_from(card.kind_key.as_str()).unwrap_or(PostKind::News);
                    let id = Uuid::parse_str(&card.id).unwrap_or(Uuid::nil());
                    let (view_href, edit_href, delete_href) = post_paths(kind, id);
                    EditorialRowView {
                        id: card.id.clone(),
                        title: card.title.clone(),
                        kind_label: card.kind_label.clone(),
                        author: card.author.clone(),
                        created: card.published.clone(),
                        view_href,
                        edit_href,
                        delete_href,
                    }
                })
                .collect();

            let content = EditorialIndexView {
                heading: "All posts".to_string(),
                has_results: !rows.is_empty(),
                rows,
                total_count: page.total_count,
                nav: page.nav,
                new_news_href: "/news/create".to_string(),
                new_article_href: "/articles/create".to_string(),
                recent_activity,
            };
            let view = LayoutContext::new(chrome, content);
            render_template_response(EditorialIndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

fn audit_entry_view(log: &AuditLogRecord) -> AuditEntryView {
    AuditEntryView {
        action: log.action.clone(),
        actor: log.actor.clone(),
        at: log
            .created_at
            .format(ACTIVITY_TIME_FORMAT)
            .unwrap_or_else(|_| log.created_at.to_string()),
    }
}

/// Read-only detail view, so index rows and post-create redirects resolve
/// on this listener without crossing to the public address.
async fn post_detail(State(state): State<EditorialState>, Path(id): Path<String>) -> Response {
    let chrome = editorial_chrome(&state.site, "");

    let Ok(id) = Uuid::parse_str(&id) else {
        return render_not_found_response(chrome);
    };

    match state.feed.post_detail(id).await {
        Ok(Some(content)) => {
            let meta = PageMetaView {
                title: format!("{} — {} Editorial", content.title, state.site.title),
                description: state.site.description.clone(),
            };
            let view = LayoutContext::new(chrome.with_meta(meta), content);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn news_create_form(State(state): State<EditorialState>) -> Response {
    create_form(state, PostKind::News)
}

async fn article_create_form(State(state): State<EditorialState>) -> Response {
    create_form(state, PostKind::Article)
}

fn create_form(state: EditorialState, kind: PostKind) -> Response {
    let view = blank_form_view(kind);
    render_form(&state, view, StatusCode::OK)
}

fn blank_form_view(kind: PostKind) -> PostFormView {
    PostFormView {
        heading: format!("New {}", kind.label().to_lowercase()),
        action: format!("/{}/create", kind.path_segment()),
        submit_label: "Publish",
        kind_label: kind.label(),
        title: String::new(),
        author: String::new(),
        body: String::new(),
        error: None,
    }
}

fn render_form(state: &EditorialState, view: PostFormView, status: StatusCode) -> Response {
    let chrome = editorial_chrome(&state.site, "");
    let meta = PageMetaView {
        title: format!("{} — {} Editorial", view.heading, state.site.title),
        description: state.site.description.clone(),
    };
    let view = LayoutContext::new(chrome.with_meta(meta), view);
    render_template_response(PostFormTemplate { view }, status)
}

async fn news_create(state: State<EditorialState>, form: Form<PostForm>) -> Response {
    create_post(state, PostKind::News, form).await
}

async fn article_create(state: State<EditorialState>, form: Form<PostForm>) -> Response {
    create_post(state, PostKind::Article, form).await
}

async fn create_post(
    State(state): State<EditorialState>,
    kind: PostKind,
    Form(form): Form<PostForm>,
) -> Response {
    let command = CreatePostCommand {
        kind,
        title: form.title.clone(),
        author: form.author.clone(),
        body: form.body.clone(),
    };

    match state.posts.create_post(EDITOR_ACTOR, command).await {
        Ok(record) => {
            counter!("newsdesk_posts_created_total").increment(1);
            Redirect::to(&format!("/posts/{}", record.id)).into_response()
        }
        Err(EditorialPostError::EmptyField(field)) => {
            let mut view = blank_form_view(kind);
            view.title = form.title;
            view.author = form.author;
            view.body = form.body;
            view.error = Some(format!("The {field} field must not be empty."));
            render_form(&state, view, StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(err) => editorial_error_response("infra::http::editorial::create_post", err),
    }
}

fn edit_form_view(record: &PostRecord) -> PostFormView {
    PostFormView {
        heading: format!("Edit {}", record.kind.label().to_lowercase()),
        action: format!("/{}/{}/edit", record.kind.path_segment(), record.id),
        submit_label: "Save changes",
        kind_label: record.kind.label(),
        title: record.title.clone(),
        author: record.author.clone(),
        body: record.body.clone(),
        error: None,
    }
}

async fn news_edit_form(state: State<EditorialState>, id: Path<String>) -> Response {
    edit_form(state, PostKind::News, id).await
}

async fn article_edit_form(state: State<EditorialState>, id: Path<String>) -> Response {
    edit_form(state, PostKind::Article, id).await
}

async fn edit_form(
    State(state): State<EditorialState>,
    kind: PostKind,
    Path(id): Path<String>,
) -> Response {
    let chrome = editorial_chrome(&state.site, "");
    let record = match load_post_of_kind(&state, kind, &id).await {
        Ok(Some(record)) => record,
        Ok(None) => return render_not_found_response(chrome),
        Err(err) => return editorial_error_response("infra::http::editorial::edit_form", err),
    };

    render_form(&state, edit_form_view(&record), StatusCode::OK)
}

async fn news_edit(state: State<EditorialState>, id: Path<String>, form: Form<PostForm>) -> Response {
    edit_post(state, PostKind::News, id, form).await
}

async fn article_edit(
    state: State<EditorialState>,
    id: Path<String>,
    form: Form<PostForm>,
) -> Response {
    edit_post(state, PostKind::Article, id, form).await
}

async fn edit_post(
    State(state): State<EditorialState>,
    kind: PostKind,
    Path(id): Path<String>,
    Form(form): Form<PostForm>,
) -> Response {
    let chrome = editorial_chrome(&state.site, "");
    let record = match load_post_of_kind(&state, kind, &id).await {
        Ok(Some(record)) => record,
        Ok(None) => return render_not_found_response(chrome),
        Err(err) => return editorial_error_response("infra::http::editorial::edit_post", err),
    };

    let command = UpdatePostCommand {
        id: record.id,
        kind: record.kind,
        title: form.title.clone(),
        author: form.author.clone(),
        body: form.body.clone(),
    };

    match state.posts.update_post(EDITOR_ACTOR, command).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(EditorialPostError::EmptyField(field)) => {
            let mut view = edit_form_view(&record);
            view.title = form.title;
            view.author = form.author;
            view.body = form.body;
            view.error = Some(format!("The {field} field must not be empty."));
            render_form(&state, view, StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(EditorialPostError::NotFound) => render_not_found_response(chrome),
        Err(err) => editorial_error_response("infra::http::editorial::edit_post", err),
    }
}

async fn news_delete_confirm(state: State<EditorialState>, id: Path<String>) -> Response {
    delete_confirm(state, PostKind::News, id).await
}

async fn article_delete_confirm(state: State<EditorialState>, id: Path<String>) -> Response {
    delete_confirm(state, PostKind::Article, id).await
}

async fn delete_confirm(
    State(state): State<EditorialState>,
    kind: PostKind,
    Path(id): Path<String>,
) -> Response {
    let chrome = editorial_chrome(&state.site, "");
    let record = match load_post_of_kind(&state, kind, &id).await {
        Ok(Some(record)) => record,
        Ok(None) => return render_not_found_response(chrome),
        Err(err) => {
            return editorial_error_response("infra::http::editorial::delete_confirm", err);
        }
    };

    let meta = PageMetaView {
        title: format!("Delete post — {} Editorial", state.site.title),
        description: state.site.description.clone(),
    };
    let content = DeleteConfirmView {
        title: record.title,
        kind_label: record.kind.label().to_string(),
        action: format!("/{}/{}/delete", kind.path_segment(), record.id),
        cancel_href: "/".to_string(),
    };
    let view = LayoutContext::new(chrome.with_meta(meta), content);
    render_template_response(DeleteConfirmTemplate { view }, StatusCode::OK)
}

async fn news_delete(state: State<EditorialState>, id: Path<String>) -> Response {
    delete_post(state, PostKind::News, id).await
}

async fn article_delete(state: State<EditorialState>, id: Path<String>) -> Response {
    delete_post(state, PostKind::Article, id).await
}

async fn delete_post(
    State(state): State<EditorialState>,
    kind: PostKind,
    Path(id): Path<String>,
) -> Response {
    let chrome = editorial_chrome(&state.site, "");
    let record = match load_post_of_kind(&state, kind, &id).await {
        Ok(Some(record)) => record,
        Ok(None) => return render_not_found_response(chrome),
        Err(err) => return editorial_error_response("infra::http::editorial::delete_post", err),
    };

    match state.posts.delete_post(EDITOR_ACTOR, record.id).await {
        Ok(_) => {
            counter!("newsdesk_posts_deleted_total").increment(1);
            Redirect::to("/").into_response()
        }
        Err(EditorialPostError::NotFound) => render_not_found_response(chrome),
        Err(err) => editorial_error_response("infra::http::editorial::delete_post", err),
    }
}

/// Resolve a path id to a post of the route's kind. An unparseable id is an
/// unknown post, not a repository error.
async fn load_post_of_kind(
    state: &EditorialState,
    kind: PostKind,
    raw_id: &str,
) -> Result<Option<PostRecord>, EditorialPostError> {
    let Ok(id) = Uuid::parse_str(raw_id) else {
        return Ok(None);
    };
    state.posts.load_post(id, kind).await
}

fn editorial_error_response(source: &'static str, err: EditorialPostError) -> Response {
    match err {
        EditorialPostError::Repo(repo) => repo_error_to_http(source, repo).into_response(),
        other => HttpError::new(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Request could not be processed",
            other.to_string(),
        )
        .into_response(),
    }
}

async fn editorial_health(State(state): State<EditorialState>) -> Response {
    db_health_response(state.db.health_check().await)
}

async fn fallback(State(state): State<EditorialState>) -> Response {
    render_not_found_response(editorial_chrome(&state.site, ""))
}
