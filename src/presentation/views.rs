use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::error::{ErrorReport, HttpError};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) origin: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(origin: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            origin,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            origin,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            origin,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: Vec<NavigationLinkView>,
    pub footer_copy: String,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn with_meta(self, meta: PageMetaView) -> Self {
        Self { meta, ..self }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: Vec<NavigationLinkView>,
    pub footer_copy: String,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer_copy: chrome.footer_copy,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: String,
    pub kind_key: String,
    pub kind_label: String,
    pub title: String,
    pub author: String,
    pub excerpt: String,
    pub published: String,
    pub iso_date: String,
    pub href: String,
}

#[derive(Debug, Clone)]
pub struct PageNav {
    pub current: u64,
    pub total_pages: u64,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

impl PageNav {
    pub fn is_paged(&self) -> bool {
        self.total_pages > 1
    }
}

#[derive(Clone)]
pub struct KindOption {
    pub value: &'static str,
    pub label: &'static str,
    pub is_selected: bool,
}

pub fn kind_options(selected: Option<&str>) -> Vec<KindOption> {
    [("news", "News"), ("article", "Article")]
        .into_iter()
        .map(|(value, label)| KindOption {
            value,
            label,
            is_selected: selected == Some(value),
        })
        .collect()
}

/// Filter form state echoed back into the listing page.
#[derive(Clone)]
pub struct FilterFormView {
    pub kind_options: Vec<KindOption>,
    pub title: String,
    pub author: String,
    pub created_after: String,
}

pub struct ListingContext {
    pub heading: String,
    pub posts: Vec<PostCard>,
    pub total_count: u64,
    pub has_results: bool,
    pub is_filtered: bool,
    pub filter_form: FilterFormView,
    pub nav: PageNav,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<ListingContext>,
}

/// Search page content: the same card list under a dedicated form.
pub struct SearchContext {
    pub posts: Vec<PostCard>,
    pub total_count: u64,
    pub has_results: bool,
    pub form: FilterFormView,
    pub nav: PageNav,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub view: LayoutContext<SearchContext>,
}

pub struct PostDetailContext {
    pub id: String,
    pub kind_label: String,
    pub title: String,
    pub author: String,
    pub paragraphs: Vec<String>,
    pub published: String,
    pub iso_date: String,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
