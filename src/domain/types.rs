//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

/// Category flag distinguishing newsroom posts from long-form articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "post_kind", rename_all = "snake_case")]
pub enum PostKind {
    News,
    Article,
}

impl PostKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PostKind::News => "news",
            PostKind::Article => "article",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostKind::News => "News",
            PostKind::Article => "Article",
        }
    }

    /// Path segment used by the editorial routes (`/news/...` vs `/articles/...`).
    pub fn path_segment(self) -> &'static str {
        match self {
            PostKind::News => "news",
            PostKind::Article => "articles",
        }
    }
}

impl TryFrom<&str> for PostKind {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "news" => Ok(PostKind::News),
            "article" => Ok(PostKind::Article),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [PostKind::News, PostKind::Article] {
            assert_eq!(PostKind::try_from(kind.as_str()), Ok(kind));
        }
        assert_eq!(PostKind::try_from("podcast"), Err(()));
    }
}
