//! In-memory repository
//!
//! Backs tests and local runs without a database. One `RwLock` guards the
//! whole state, which makes the reaction uniqueness check atomic.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, MediaAssetId, PostId, UserId};
use kernel::pagination::PageRequest;
use tokio::sync::RwLock;

use crate::domain::entities::{
    Category, Comment, MediaAsset, Post, PostViews, Reaction, SitemapEntry, Tag,
};
use crate::domain::repository::{
    AdminPostQuery, CommentRepository, MediaRepository, PostRepository, PublicPostQuery,
    ReactionRepository, TaxonomyRepository,
};
use crate::domain::value_objects::{PostOrdering, PostStatus, ReactionType, Slug};
use crate::error::{BlogError, BlogResult};

#[derive(Default)]
struct State {
    posts: HashMap<PostId, Post>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    comments: Vec<Comment>,
    reactions: Vec<Reaction>,
    media: Vec<MediaAsset>,
}

impl State {
    fn post_by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.values().find(|p| p.slug.as_str() == slug)
    }

    /// Post with its derived like counter filled in.
    fn hydrate(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.likes_count = self
            .reactions
            .iter()
            .filter(|r| r.post_id == post.id && r.reaction_type == ReactionType::Like)
            .count() as i64;
        post
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBlogRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryBlogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reactions on a post, anonymous ones included.
    pub async fn reaction_count(&self, post_id: PostId) -> usize {
        self.state
            .read()
            .await
            .reactions
            .iter()
            .filter(|r| r.post_id == post_id)
            .count()
    }

    pub async fn views(&self, slug: &str) -> Option<i64> {
        self.state.read().await.post_by_slug(slug).map(|p| p.views_count)
    }
}

fn page_slice<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn sort_public(posts: &mut [Post], ordering: PostOrdering) {
    match ordering {
        PostOrdering::NewestFirst | PostOrdering::Relevance => {
            posts.sort_by_key(|p| (Reverse(p.published_at), Reverse(p.views_count)))
        }
        PostOrdering::OldestFirst => {
            posts.sort_by_key(|p| (p.published_at, Reverse(p.views_count)))
        }
        PostOrdering::ViewsAscending => {
            posts.sort_by_key(|p| (p.views_count, Reverse(p.published_at)))
        }
        PostOrdering::ViewsDescending => {
            posts.sort_by_key(|p| (Reverse(p.views_count), Reverse(p.published_at)))
        }
    }
}

impl PostRepository for InMemoryBlogRepository {
    async fn list_public(
        &self,
        query: &PublicPostQuery,
        now: DateTime<Utc>,
    ) -> BlogResult<(Vec<Post>, u64)> {
        let state = self.state.read().await;
        let needle = query.q.as_deref().map(|q| q.trim().to_lowercase());

        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|p| p.is_public(now))
            .filter(|p| {
                query.category.as_deref().is_none_or(|slug| {
                    p.category.as_ref().is_some_and(|c| c.slug.as_str() == slug)
                })
            })
            .filter(|p| {
                query
                    .tag
                    .as_deref()
                    .is_none_or(|slug| p.tags.iter().any(|t| t.slug.as_str() == slug))
            })
            .filter(|p| query.author.is_none_or(|author| p.author.id == author))
            .filter(|p| {
                needle.as_deref().is_none_or(|q| {
                    q.is_empty()
                        || contains_ci(&p.title, q)
                        || contains_ci(&p.summary, q)
                        || contains_ci(&p.content, q)
                })
            })
            .map(|p| state.hydrate(p))
            .collect();

        sort_public(&mut posts, query.ordering);
        let total = posts.len() as u64;
        Ok((page_slice(&posts, query.page), total))
    }

    async fn find_public_by_slug(
        &self,
        slug: &str,
        now: DateTime<Utc>,
    ) -> BlogResult<Option<Post>> {
        let state = self.state.read().await;
        Ok(state
            .post_by_slug(slug)
            .filter(|p| p.is_public(now))
            .map(|p| state.hydrate(p)))
    }

    async fn find_by_slug(&self, slug: &str) -> BlogResult<Option<Post>> {
        let state = self.state.read().await;
        Ok(state.post_by_slug(slug).map(|p| state.hydrate(p)))
    }

    async fn list_admin(&self, query: &AdminPostQuery) -> BlogResult<(Vec<Post>, u64)> {
        let state = self.state.read().await;
        let needle = query.search.as_deref().map(|s| s.trim().to_lowercase());

        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|p| query.status.is_none_or(|s| p.status == s))
            .filter(|p| needle.as_deref().is_none_or(|s| contains_ci(&p.title, s)))
            .map(|p| state.hydrate(p))
            .collect();
        posts.sort_by_key(|p| Reverse(p.created_at));

        let total = posts.len() as u64;
        Ok((page_slice(&posts, query.page), total))
    }

    async fn slug_taken(&self, slug: &Slug, except: Option<PostId>) -> BlogResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .values()
            .any(|p| &p.slug == slug && Some(p.id) != except))
    }

    async fn create_post(&self, post: &Post) -> BlogResult<()> {
        let mut state = self.state.write().await;
        if state.posts.values().any(|p| p.slug == post.slug) {
            return Err(BlogError::validation(
                "slug",
                "post with this slug already exists.",
            ));
        }
        state.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn update_post(&self, post: &Post) -> BlogResult<()> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post.id) {
            return Err(BlogError::NotFound);
        }
        state.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> BlogResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.posts.remove(&id).is_some();
        if removed {
            state.comments.retain(|c| c.post_id != id);
            state.reactions.retain(|r| r.post_id != id);
        }
        Ok(removed)
    }

    async fn set_status(
        &self,
        slugs: &[String],
        status: PostStatus,
        now: DateTime<Utc>,
    ) -> BlogResult<u64> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for post in state
            .posts
            .values_mut()
            .filter(|p| slugs.iter().any(|s| s == p.slug.as_str()))
        {
            post.set_status(status, now);
            post.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }

    async fn increment_views(&self, slug: &str) -> BlogResult<bool> {
        let mut state = self.state.write().await;
        match state.posts.values_mut().find(|p| p.slug.as_str() == slug) {
            Some(post) => {
                post.views_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn top_by_views(&self, limit: u32) -> BlogResult<Vec<PostViews>> {
        let state = self.state.read().await;
        let mut posts: Vec<&Post> = state.posts.values().collect();
        posts.sort_by_key(|p| (Reverse(p.views_count), Reverse(p.created_at)));
        Ok(posts
            .into_iter()
            .take(limit as usize)
            .map(|p| PostViews {
                title: p.title.clone(),
                slug: p.slug.clone(),
                views_count: p.views_count,
            })
            .collect())
    }

    async fn list_sitemap(&self, now: DateTime<Utc>) -> BlogResult<Vec<SitemapEntry>> {
        let state = self.state.read().await;
        let mut posts: Vec<&Post> = state.posts.values().filter(|p| p.is_public(now)).collect();
        posts.sort_by_key(|p| Reverse(p.published_at));
        Ok(posts
            .into_iter()
            .map(|p| SitemapEntry {
                slug: p.slug.clone(),
                updated_at: p.updated_at,
            })
            .collect())
    }
}

impl TaxonomyRepository for InMemoryBlogRepository {
    async fn list_categories(&self) -> BlogResult<Vec<Category>> {
        let mut categories = self.state.read().await.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn list_tags(&self) -> BlogResult<Vec<Tag>> {
        let mut tags = self.state.read().await.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_category(&self, slug: &str) -> BlogResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .iter()
            .find(|c| c.slug.as_str() == slug)
            .cloned())
    }

    async fn find_tags(&self, slugs: &[String]) -> BlogResult<Vec<Tag>> {
        let state = self.state.read().await;
        Ok(state
            .tags
            .iter()
            .filter(|t| slugs.iter().any(|s| s == t.slug.as_str()))
            .cloned()
            .collect())
    }

    async fn category_exists(&self, name: &str, slug: &Slug) -> BlogResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .iter()
            .any(|c| c.name == name || &c.slug == slug))
    }

    async fn tag_exists(&self, name: &str, slug: &Slug) -> BlogResult<bool> {
        let state = self.state.read().await;
        Ok(state.tags.iter().any(|t| t.name == name || &t.slug == slug))
    }

    async fn create_category(&self, category: &Category) -> BlogResult<()> {
        self.state.write().await.categories.push(category.clone());
        Ok(())
    }

    async fn delete_category(&self, slug: &str) -> BlogResult<bool> {
        let mut state = self.state.write().await;
        let Some(index) = state.categories.iter().position(|c| c.slug.as_str() == slug) else {
            return Ok(false);
        };
        let removed = state.categories.remove(index);
        for post in state.posts.values_mut() {
            if post.category.as_ref().is_some_and(|c| c.id == removed.id) {
                post.category = None;
            }
        }
        for category in state.categories.iter_mut() {
            if category.parent_id == Some(removed.id) {
                category.parent_id = None;
            }
        }
        Ok(true)
    }

    async fn create_tag(&self, tag: &Tag) -> BlogResult<()> {
        self.state.write().await.tags.push(tag.clone());
        Ok(())
    }

    async fn delete_tag(&self, slug: &str) -> BlogResult<bool> {
        let mut state = self.state.write().await;
        let Some(index) = state.tags.iter().position(|t| t.slug.as_str() == slug) else {
            return Ok(false);
        };
        let removed = state.tags.remove(index);
        for post in state.posts.values_mut() {
            post.tags.retain(|t| t.id != removed.id);
        }
        Ok(true)
    }
}

impl CommentRepository for InMemoryBlogRepository {
    async fn list_approved(&self, post_id: PostId) -> BlogResult<Vec<Comment>> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && c.is_approved)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn find_comment(&self, id: CommentId) -> BlogResult<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn create_comment(&self, comment: &Comment) -> BlogResult<()> {
        self.state.write().await.comments.push(comment.clone());
        Ok(())
    }

    async fn list_comments(
        &self,
        is_approved: Option<bool>,
        page: PageRequest,
    ) -> BlogResult<(Vec<Comment>, u64)> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| is_approved.is_none_or(|a| c.is_approved == a))
            .cloned()
            .collect();
        comments.sort_by_key(|c| Reverse(c.created_at));
        let total = comments.len() as u64;
        Ok((page_slice(&comments, page), total))
    }

    async fn approve_comments(&self, ids: &[CommentId]) -> BlogResult<u64> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for comment in state
            .comments
            .iter_mut()
            .filter(|c| !c.is_approved && ids.contains(&c.id))
        {
            comment.is_approved = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_comment(&self, id: CommentId) -> BlogResult<bool> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        let removed = state.comments.len() != before;
        if removed {
            for reply in state.comments.iter_mut() {
                if reply.parent_id == Some(id) {
                    reply.parent_id = None;
                }
            }
        }
        Ok(removed)
    }
}

impl ReactionRepository for InMemoryBlogRepository {
    async fn add_reaction(&self, reaction: &Reaction) -> BlogResult<bool> {
        let mut state = self.state.write().await;
        let duplicate = reaction.user_id.is_some()
            && state.reactions.iter().any(|r| {
                r.user_id == reaction.user_id
                    && r.post_id == reaction.post_id
                    && r.reaction_type == reaction.reaction_type
            });
        if duplicate {
            return Ok(false);
        }
        state.reactions.push(reaction.clone());
        Ok(true)
    }

    async fn remove_reaction(
        &self,
        post_id: PostId,
        user_id: UserId,
        reaction_type: ReactionType,
    ) -> BlogResult<bool> {
        let mut state = self.state.write().await;
        let before = state.reactions.len();
        state.reactions.retain(|r| {
            !(r.post_id == post_id
                && r.user_id == Some(user_id)
                && r.reaction_type == reaction_type)
        });
        Ok(state.reactions.len() != before)
    }
}

impl MediaRepository for InMemoryBlogRepository {
    async fn list_media(&self, page: PageRequest) -> BlogResult<(Vec<MediaAsset>, u64)> {
        let state = self.state.read().await;
        let mut assets = state.media.clone();
        assets.sort_by_key(|m| Reverse(m.created_at));
        let total = assets.len() as u64;
        Ok((page_slice(&assets, page), total))
    }

    async fn create_media(&self, asset: &MediaAsset) -> BlogResult<()> {
        self.state.write().await.media.push(asset.clone());
        Ok(())
    }

    async fn delete_media(&self, id: MediaAssetId) -> BlogResult<bool> {
        let mut state = self.state.write().await;
        let before = state.media.len();
        state.media.retain(|m| m.id != id);
        Ok(state.media.len() != before)
    }
}
