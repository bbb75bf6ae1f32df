//! Read models
//!
//! Public payloads built from domain entities. They are cached as JSON, so
//! they round-trip through serde.

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, PostId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Category, Comment, Post, Tag};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorBrief {
    pub id: UserId,
    pub username: Option<String>,
}

/// `{name, slug}` for categories and tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyBrief {
    pub name: String,
    pub slug: String,
}

impl From<&Category> for TaxonomyBrief {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.to_string(),
        }
    }
}

impl From<&Tag> for TaxonomyBrief {
    fn from(tag: &Tag) -> Self {
        Self {
            name: tag.name.clone(),
            slug: tag.slug.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostListItem {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
    pub author: AuthorBrief,
    pub category: Option<TaxonomyBrief>,
    pub tags: Vec<TaxonomyBrief>,
    pub featured_image: Option<String>,
    pub reading_time_minutes: i32,
    pub views_count: i64,
    pub likes_count: i64,
}

impl From<&Post> for PostListItem {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.to_string(),
            summary: post.summary.clone(),
            published_at: post.published_at,
            author: AuthorBrief {
                id: post.author.id,
                username: post.author.username.clone(),
            },
            category: post.category.as_ref().map(TaxonomyBrief::from),
            tags: post.tags.iter().map(TaxonomyBrief::from).collect(),
            featured_image: post.featured_image.clone(),
            reading_time_minutes: post.reading_time_minutes,
            views_count: post.views_count,
            likes_count: post.likes_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub item: PostListItem,
    pub content: String,
    pub canonical_url: Option<String>,
    pub meta_title: String,
    pub meta_description: String,
    pub allow_comments: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for PostDetail {
    fn from(post: &Post) -> Self {
        Self {
            item: PostListItem::from(post),
            content: post.content.clone(),
            canonical_url: post.canonical_url.clone(),
            meta_title: post.meta_title.clone(),
            meta_description: post.meta_description.clone(),
            allow_comments: post.allow_comments,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicComment {
    pub id: CommentId,
    pub author_display: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub parent_id: Option<CommentId>,
}

impl From<&Comment> for PublicComment {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            author_display: comment.author_display().to_string(),
            content: comment.content.clone(),
            created_at: comment.created_at,
            parent_id: comment.parent_id,
        }
    }
}
