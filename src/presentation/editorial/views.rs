//! View models for the editorial surface.

use askama::Template;

use crate::presentation::views::{LayoutContext, PageNav};

#[derive(Clone)]
pub struct EditorialRowView {
    pub id: String,
    pub title: String,
    pub kind_label: String,
    pub author: String,
    pub created: String,
    pub view_href: String,
    pub edit_href: String,
    pub delete_href: String,
}

/// One line in the recent-activity panel, already formatted for display.
#[derive(Clone)]
pub struct AuditEntryView {
    pub action: String,
    pub actor: String,
    pub at: String,
}

pub struct EditorialIndexView {
    pub heading: String,
    pub rows: Vec<EditorialRowView>,
    pub total_count: u64,
    pub has_results: bool,
    pub nav: PageNav,
    pub new_news_href: String,
    pub new_article_href: String,
    pub recent_activity: Vec<AuditEntryView>,
}

#[derive(Template)]
#[template(path = "editorial/index.html")]
pub struct EditorialIndexTemplate {
    pub view: LayoutContext<EditorialIndexView>,
}

/// Create/edit form. `action` points back at the route that renders it, so
/// validation failures re-render in place with `error` set.
pub struct PostFormView {
    pub heading: String,
    pub action: String,
    pub submit_label: &'static str,
    pub kind_label: &'static str,
    pub title: String,
    pub author: String,
    pub body: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "editorial/post_form.html")]
pub struct PostFormTemplate {
    pub view: LayoutContext<PostFormView>,
}

pub struct DeleteConfirmView {
    pub title: String,
    pub kind_label: String,
    pub action: String,
    pub cancel_href: String,
}

#[derive(Template)]
#[template(path = "editorial/post_delete.html")]
pub struct DeleteConfirmTemplate {
    pub view: LayoutContext<DeleteConfirmView>,
}
