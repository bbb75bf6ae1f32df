//! Domain Value Objects

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::services::slugify;
use crate::error::{BlogError, BlogResult};

/// URL-safe identifier for posts, categories and tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub const MAX_LEN: usize = 255;

    /// Accept an explicit slug, or derive one from `source` when `raw` is blank.
    ///
    /// Explicit slugs must already be made of letters, digits, `_` and `-`.
    pub fn parse_or_derive(
        field: &'static str,
        raw: Option<&str>,
        source: &str,
    ) -> BlogResult<Self> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => Self::parse(field, explicit),
            None => {
                let derived = slugify(source);
                if derived.is_empty() {
                    return Err(BlogError::validation(field, "This field may not be blank."));
                }
                Ok(Self(truncate(derived, Self::MAX_LEN)))
            }
        }
    }

    pub fn parse(field: &'static str, raw: &str) -> BlogResult<Self> {
        let raw = raw.trim();
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BlogError::validation(
                field,
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            ));
        }
        if raw.chars().count() > Self::MAX_LEN {
            return Err(BlogError::validation(
                field,
                format!("Ensure this field has no more than {} characters.", Self::MAX_LEN),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Rehydrate a slug read back from storage.
    pub fn from_trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn truncate(value: String, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].trim_end_matches(['-', '_']).to_string(),
        None => value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            "archived" => Some(PostStatus::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    #[default]
    Like,
    Love,
}

impl ReactionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Love => "love",
        }
    }

    /// `None` input means the default `like`; unknown names are rejected.
    pub fn parse(raw: Option<&str>) -> BlogResult<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("like") => Ok(ReactionType::Like),
            Some("love") => Ok(ReactionType::Love),
            Some(other) => Err(BlogError::validation(
                "type",
                format!("\"{other}\" is not a valid choice."),
            )),
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order of the public post list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PostOrdering {
    #[default]
    NewestFirst,
    OldestFirst,
    /// Search rank; only meaningful together with a query
    Relevance,
    ViewsAscending,
    ViewsDescending,
}

impl PostOrdering {
    /// Unknown values, and `relevance` without a query, fall back to newest first.
    pub fn resolve(raw: Option<&str>, has_query: bool) -> Self {
        match raw.map(str::trim) {
            Some("published_at") => PostOrdering::OldestFirst,
            Some("relevance") if has_query => PostOrdering::Relevance,
            Some("views") => PostOrdering::ViewsAscending,
            Some("-views") => PostOrdering::ViewsDescending,
            _ => PostOrdering::NewestFirst,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PostOrdering::NewestFirst => "-published_at",
            PostOrdering::OldestFirst => "published_at",
            PostOrdering::Relevance => "relevance",
            PostOrdering::ViewsAscending => "views",
            PostOrdering::ViewsDescending => "-views",
        }
    }
}
