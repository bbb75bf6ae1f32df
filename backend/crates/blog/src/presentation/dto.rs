//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, CommentId, MediaAssetId, PostId, TagId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::views::{AuthorBrief, TaxonomyBrief};
use crate::application::{CategoryInput, CommentInput, MediaInput, PostInput, TagInput};
use crate::domain::admin::{AdminCapabilities, AdminEntity};
use crate::domain::entities::{Category, Comment, MediaAsset, Post, PostViews, Tag};

// ============================================================================
// Public
// ============================================================================

/// `GET /blogs` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostListQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    /// User id; validated by the handler
    pub author: Option<String>,
    pub q: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub parent_id: Option<CommentId>,
}

impl From<CommentRequest> for CommentInput {
    fn from(req: CommentRequest) -> Self {
        Self {
            content: req.content,
            author_name: req.author_name,
            author_email: req.author_email,
            parent_id: req.parent_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub reaction_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn new(status: &'static str) -> Self {
        Self { status }
    }
}

// ============================================================================
// Admin: Posts
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminPostListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Body of `POST`, `PUT` and `PATCH /admin/blogs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostWriteRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Category slug
    pub category: Option<String>,
    /// Tag slugs
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub canonical_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub allow_comments: Option<bool>,
}

impl From<PostWriteRequest> for PostInput {
    fn from(req: PostWriteRequest) -> Self {
        Self {
            title: req.title,
            slug: req.slug,
            summary: req.summary,
            content: req.content,
            status: req.status,
            published_at: req.published_at,
            category: req.category,
            tags: req.tags,
            featured_image: req.featured_image,
            canonical_url: req.canonical_url,
            meta_title: req.meta_title,
            meta_description: req.meta_description,
            allow_comments: req.allow_comments,
        }
    }
}

/// Full post as seen by staff
#[derive(Debug, Clone, Serialize)]
pub struct AdminPostResponse {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub author: AuthorBrief,
    pub category: Option<TaxonomyBrief>,
    pub tags: Vec<TaxonomyBrief>,
    pub featured_image: Option<String>,
    pub canonical_url: Option<String>,
    pub meta_title: String,
    pub meta_description: String,
    pub reading_time_minutes: i32,
    pub views_count: i64,
    pub likes_count: i64,
    pub allow_comments: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for AdminPostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.to_string(),
            summary: post.summary.clone(),
            content: post.content.clone(),
            status: post.status.to_string(),
            published_at: post.published_at,
            author: AuthorBrief {
                id: post.author.id,
                username: post.author.username.clone(),
            },
            category: post.category.as_ref().map(TaxonomyBrief::from),
            tags: post.tags.iter().map(TaxonomyBrief::from).collect(),
            featured_image: post.featured_image.clone(),
            canonical_url: post.canonical_url.clone(),
            meta_title: post.meta_title.clone(),
            meta_description: post.meta_description.clone(),
            reading_time_minutes: post.reading_time_minutes,
            views_count: post.views_count,
            likes_count: post.likes_count,
            allow_comments: post.allow_comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<Post> for AdminPostResponse {
    fn from(post: Post) -> Self {
        Self::from(&post)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkActionRequest {
    #[serde(default)]
    pub slugs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdatedResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostViewsResponse {
    pub title: String,
    pub slug: String,
    pub views_count: i64,
}

impl From<PostViews> for PostViewsResponse {
    fn from(views: PostViews) -> Self {
        Self {
            title: views.title,
            slug: views.slug.to_string(),
            views_count: views.views_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResponse {
    pub top_posts: Vec<PostViewsResponse>,
}

// ============================================================================
// Admin: Comments
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminCommentQuery {
    pub is_approved: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApproveCommentsRequest {
    #[serde(default)]
    pub ids: Vec<CommentId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminCommentResponse {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: Option<UserId>,
    pub author_display: String,
    pub author_name: Option<String>,
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for AdminCommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            author_display: comment.author_display().to_string(),
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_name: comment.author_name,
            parent_id: comment.parent_id,
            content: comment.content,
            is_approved: comment.is_approved,
            created_at: comment.created_at,
        }
    }
}

// ============================================================================
// Admin: Taxonomy
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Parent category slug
    pub parent: Option<String>,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(req: CategoryRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            description: req.description,
            parent: req.parent,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug.to_string(),
            description: category.description,
            parent_id: category.parent_id,
            created_at: category.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagRequest {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
}

impl From<TagRequest> for TagInput {
    fn from(req: TagRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagResponse {
    pub id: TagId,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug.to_string(),
            created_at: tag.created_at,
        }
    }
}

// ============================================================================
// Admin: Media
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaRequest {
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub mime_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

impl From<MediaRequest> for MediaInput {
    fn from(req: MediaRequest) -> Self {
        Self {
            file_url: req.file_url,
            mime_type: req.mime_type,
            width: req.width,
            height: req.height,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaResponse {
    pub id: MediaAssetId,
    pub uploader_id: Option<UserId>,
    pub file_url: String,
    pub mime_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<MediaAsset> for MediaResponse {
    fn from(asset: MediaAsset) -> Self {
        Self {
            id: asset.id,
            uploader_id: asset.uploader_id,
            file_url: asset.file_url,
            mime_type: asset.mime_type,
            width: asset.width,
            height: asset.height,
            created_at: asset.created_at,
        }
    }
}

// ============================================================================
// Admin: Registry
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegistryEntry {
    pub name: &'static str,
    #[serde(flatten)]
    pub capabilities: AdminCapabilities,
}

impl From<(AdminEntity, AdminCapabilities)> for RegistryEntry {
    fn from((entity, capabilities): (AdminEntity, AdminCapabilities)) -> Self {
        Self {
            name: entity.name(),
            capabilities,
        }
    }
}
