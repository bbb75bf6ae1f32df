//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in `infra/`.

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, MediaAssetId, PostId, UserId};
use kernel::pagination::PageRequest;

use crate::domain::entities::{
    Category, Comment, MediaAsset, Post, PostViews, Reaction, SitemapEntry, Tag,
};
use crate::domain::value_objects::{PostOrdering, PostStatus, ReactionType, Slug};
use crate::error::BlogResult;

/// Filters of the public post list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPostQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub author: Option<UserId>,
    /// Full-text search
    pub q: Option<String>,
    pub ordering: PostOrdering,
    pub page: PageRequest,
}

/// Filters of the admin post list; every status is visible
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPostQuery {
    pub status: Option<PostStatus>,
    /// Case-insensitive title match
    pub search: Option<String>,
    pub page: PageRequest,
}

#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    /// Public posts (published, `published_at <= now`) and their total.
    async fn list_public(
        &self,
        query: &PublicPostQuery,
        now: DateTime<Utc>,
    ) -> BlogResult<(Vec<Post>, u64)>;

    async fn find_public_by_slug(&self, slug: &str, now: DateTime<Utc>)
    -> BlogResult<Option<Post>>;

    /// Any status
    async fn find_by_slug(&self, slug: &str) -> BlogResult<Option<Post>>;

    async fn list_admin(&self, query: &AdminPostQuery) -> BlogResult<(Vec<Post>, u64)>;

    async fn slug_taken(&self, slug: &Slug, except: Option<PostId>) -> BlogResult<bool>;

    async fn create_post(&self, post: &Post) -> BlogResult<()>;

    /// Replace every editable column and the tag set of `post.id`.
    async fn update_post(&self, post: &Post) -> BlogResult<()>;

    async fn delete_post(&self, id: PostId) -> BlogResult<bool>;

    /// Set the status of every listed post; publishing stamps a missing
    /// `published_at` with `now`. Returns the number of posts changed.
    async fn set_status(
        &self,
        slugs: &[String],
        status: PostStatus,
        now: DateTime<Utc>,
    ) -> BlogResult<u64>;

    /// Atomic `views_count + 1`. Returns whether the post exists.
    async fn increment_views(&self, slug: &str) -> BlogResult<bool>;

    async fn top_by_views(&self, limit: u32) -> BlogResult<Vec<PostViews>>;

    async fn list_sitemap(&self, now: DateTime<Utc>) -> BlogResult<Vec<SitemapEntry>>;
}

#[trait_variant::make(TaxonomyRepository: Send)]
pub trait LocalTaxonomyRepository {
    /// Ordered by name
    async fn list_categories(&self) -> BlogResult<Vec<Category>>;

    /// Ordered by name
    async fn list_tags(&self) -> BlogResult<Vec<Tag>>;

    async fn find_category(&self, slug: &str) -> BlogResult<Option<Category>>;

    /// Tags matching `slugs`; unknown slugs are simply absent.
    async fn find_tags(&self, slugs: &[String]) -> BlogResult<Vec<Tag>>;

    /// Whether a category with this name or slug exists
    async fn category_exists(&self, name: &str, slug: &Slug) -> BlogResult<bool>;

    /// Whether a tag with this name or slug exists
    async fn tag_exists(&self, name: &str, slug: &Slug) -> BlogResult<bool>;

    async fn create_category(&self, category: &Category) -> BlogResult<()>;

    async fn delete_category(&self, slug: &str) -> BlogResult<bool>;

    async fn create_tag(&self, tag: &Tag) -> BlogResult<()>;

    async fn delete_tag(&self, slug: &str) -> BlogResult<bool>;
}

#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    /// Approved comments of a post, oldest first
    async fn list_approved(&self, post_id: PostId) -> BlogResult<Vec<Comment>>;

    async fn find_comment(&self, id: CommentId) -> BlogResult<Option<Comment>>;

    async fn create_comment(&self, comment: &Comment) -> BlogResult<()>;

    /// Newest first
    async fn list_comments(
        &self,
        is_approved: Option<bool>,
        page: PageRequest,
    ) -> BlogResult<(Vec<Comment>, u64)>;

    /// Returns the number of comments that changed.
    async fn approve_comments(&self, ids: &[CommentId]) -> BlogResult<u64>;

    async fn delete_comment(&self, id: CommentId) -> BlogResult<bool>;
}

#[trait_variant::make(ReactionRepository: Send)]
pub trait LocalReactionRepository {
    /// Insert unless the (user, post, type) triple already exists.
    /// Anonymous reactions always insert. Returns whether a row was written.
    async fn add_reaction(&self, reaction: &Reaction) -> BlogResult<bool>;

    async fn remove_reaction(
        &self,
        post_id: PostId,
        user_id: UserId,
        reaction_type: ReactionType,
    ) -> BlogResult<bool>;
}

#[trait_variant::make(MediaRepository: Send)]
pub trait LocalMediaRepository {
    /// Newest first
    async fn list_media(&self, page: PageRequest) -> BlogResult<(Vec<MediaAsset>, u64)>;

    async fn create_media(&self, asset: &MediaAsset) -> BlogResult<()>;

    async fn delete_media(&self, id: MediaAssetId) -> BlogResult<bool>;
}

/// Everything the blog surface needs from storage
pub trait BlogStore:
    PostRepository
    + TaxonomyRepository
    + CommentRepository
    + ReactionRepository
    + MediaRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> BlogStore for T where
    T: PostRepository
        + TaxonomyRepository
        + CommentRepository
        + ReactionRepository
        + MediaRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
