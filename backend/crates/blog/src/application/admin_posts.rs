//! Staff post management
//!
//! Every write sanitizes content, recomputes reading time and evicts the
//! cached detail page of both the old and the new slug.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::Principal;
use kernel::id::PostId;
use kernel::pagination::Page;
use platform::cache::CacheService;

use crate::application::cache_keys::detail_cache_key;
use crate::application::public_posts::evict;
use crate::domain::admin::PostBulkAction;
use crate::domain::entities::{AuthorRef, Post, PostViews};
use crate::domain::repository::{AdminPostQuery, PostRepository, TaxonomyRepository};
use crate::domain::services::{reading_time_minutes, sanitize_post_html};
use crate::domain::value_objects::{PostStatus, Slug};
use crate::error::{BlogError, BlogResult};

const MAX_TITLE_LEN: usize = 200;
const MAX_META_TITLE_LEN: usize = 255;
const MAX_META_DESCRIPTION_LEN: usize = 320;
const MAX_URL_LEN: usize = 500;

/// How omitted fields are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Omitted fields take their defaults
    Replace,
    /// Omitted fields keep their current value
    Partial,
}

/// Editable post fields; category and tags are referenced by slug.
/// An empty string clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub canonical_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub allow_comments: Option<bool>,
}

pub struct AdminPostsUseCase<R>
where
    R: PostRepository + TaxonomyRepository,
{
    repo: Arc<R>,
    cache: CacheService,
}

impl<R> AdminPostsUseCase<R>
where
    R: PostRepository + TaxonomyRepository,
{
    pub fn new(repo: Arc<R>, cache: CacheService) -> Self {
        Self { repo, cache }
    }

    pub async fn list(&self, query: AdminPostQuery) -> BlogResult<Page<Post>> {
        let (posts, total) = self.repo.list_admin(&query).await?;
        if query.page.is_out_of_range(total) {
            return Err(BlogError::InvalidPage);
        }
        Ok(Page::new(posts, total, query.page))
    }

    pub async fn get(&self, slug: &str) -> BlogResult<Post> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or(BlogError::NotFound)
    }

    pub async fn create(&self, input: PostInput, author: &Principal) -> BlogResult<Post> {
        let now = Utc::now();
        let mut post = Post {
            id: PostId::new(),
            title: String::new(),
            slug: Slug::from_trusted(""),
            summary: String::new(),
            content: String::new(),
            status: PostStatus::Draft,
            published_at: None,
            author: AuthorRef {
                id: author.user_id,
                username: author.username.clone(),
            },
            category: None,
            tags: Vec::new(),
            featured_image: None,
            canonical_url: None,
            meta_title: String::new(),
            meta_description: String::new(),
            reading_time_minutes: 1,
            views_count: 0,
            likes_count: 0,
            allow_comments: true,
            created_at: now,
            updated_at: now,
        };
        self.apply(&mut post, input, WriteMode::Replace, now).await?;
        self.repo.create_post(&post).await?;

        tracing::info!(post_id = %post.id, slug = %post.slug, author_id = %author.user_id, "Post created");
        Ok(post)
    }

    pub async fn update(&self, slug: &str, input: PostInput, mode: WriteMode) -> BlogResult<Post> {
        let mut post = self.get(slug).await?;
        let previous_slug = post.slug.clone();

        self.apply(&mut post, input, mode, Utc::now()).await?;
        self.repo.update_post(&post).await?;

        evict(&self.cache, &detail_cache_key(previous_slug.as_str())).await;
        evict(&self.cache, &detail_cache_key(post.slug.as_str())).await;
        tracing::info!(post_id = %post.id, slug = %post.slug, "Post updated");
        Ok(post)
    }

    pub async fn delete(&self, slug: &str) -> BlogResult<()> {
        let post = self.get(slug).await?;
        if !self.repo.delete_post(post.id).await? {
            return Err(BlogError::NotFound);
        }
        evict(&self.cache, &detail_cache_key(slug)).await;
        tracing::info!(post_id = %post.id, slug = %slug, "Post deleted");
        Ok(())
    }

    pub async fn bulk(&self, action: PostBulkAction, slugs: &[String]) -> BlogResult<u64> {
        let updated = self
            .repo
            .set_status(slugs, action.target_status(), Utc::now())
            .await?;
        for slug in slugs {
            evict(&self.cache, &detail_cache_key(slug)).await;
        }
        tracing::info!(action = ?action, requested = slugs.len(), updated, "Bulk post action");
        Ok(updated)
    }

    pub async fn analytics(&self, limit: u32) -> BlogResult<Vec<PostViews>> {
        self.repo.top_by_views(limit).await
    }

    async fn apply(
        &self,
        post: &mut Post,
        input: PostInput,
        mode: WriteMode,
        now: DateTime<Utc>,
    ) -> BlogResult<()> {
        let partial = mode == WriteMode::Partial;

        match input.title.map(|t| t.trim().to_string()) {
            Some(title) if title.is_empty() => {
                return Err(BlogError::validation("title", "This field may not be blank."));
            }
            Some(title) => {
                check_len("title", &title, MAX_TITLE_LEN)?;
                post.title = title;
            }
            None if partial => {}
            None => return Err(BlogError::validation("title", "This field is required.")),
        }

        if !partial || input.slug.is_some() {
            let slug = Slug::parse_or_derive("slug", input.slug.as_deref(), &post.title)?;
            if self.repo.slug_taken(&slug, Some(post.id)).await? {
                return Err(BlogError::validation(
                    "slug",
                    "post with this slug already exists.",
                ));
            }
            post.slug = slug;
        }

        if let Some(summary) = pick(input.summary, partial) {
            post.summary = summary;
        }
        if let Some(content) = pick(input.content, partial) {
            post.content = sanitize_post_html(&content);
        }
        post.reading_time_minutes = reading_time_minutes(&post.content);

        if let Some(meta_title) = pick(input.meta_title, partial) {
            check_len("meta_title", &meta_title, MAX_META_TITLE_LEN)?;
            post.meta_title = meta_title;
        }
        if let Some(meta_description) = pick(input.meta_description, partial) {
            check_len("meta_description", &meta_description, MAX_META_DESCRIPTION_LEN)?;
            post.meta_description = meta_description;
        }
        if let Some(url) = pick(input.featured_image, partial) {
            post.featured_image = optional_url("featured_image", url)?;
        }
        if let Some(url) = pick(input.canonical_url, partial) {
            post.canonical_url = optional_url("canonical_url", url)?;
        }
        match input.allow_comments {
            Some(allow) => post.allow_comments = allow,
            None if partial => {}
            None => post.allow_comments = true,
        }

        if let Some(category) = pick(input.category, partial) {
            post.category = match category.trim() {
                "" => None,
                slug => Some(self.repo.find_category(slug).await?.ok_or_else(|| {
                    BlogError::validation(
                        "category",
                        format!("Object with slug={slug} does not exist."),
                    )
                })?),
            };
        }
        if let Some(mut slugs) = pick(input.tags, partial) {
            slugs.sort_unstable();
            slugs.dedup();
            let mut tags = self.repo.find_tags(&slugs).await?;
            if let Some(missing) = slugs
                .iter()
                .find(|s| !tags.iter().any(|t| t.slug.as_str() == s.as_str()))
            {
                return Err(BlogError::validation(
                    "tags",
                    format!("Object with slug={missing} does not exist."),
                ));
            }
            tags.sort_by(|a, b| a.name.cmp(&b.name));
            post.tags = tags;
        }

        if !partial || input.published_at.is_some() {
            post.published_at = input.published_at;
        }
        let status = match input.status.as_deref().map(str::trim) {
            Some(raw) => PostStatus::parse(raw).ok_or_else(|| {
                BlogError::validation("status", format!("\"{raw}\" is not a valid choice."))
            })?,
            None if partial => post.status,
            None => PostStatus::Draft,
        };
        post.set_status(status, now);

        post.updated_at = now;
        Ok(())
    }
}

/// Value to write: the given one, the default for full writes, or nothing
/// (keep current) for partial writes.
fn pick<T: Default>(value: Option<T>, partial: bool) -> Option<T> {
    match value {
        Some(v) => Some(v),
        None if partial => None,
        None => Some(T::default()),
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> BlogResult<()> {
    if value.chars().count() > max {
        return Err(BlogError::validation(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(())
}

fn optional_url(field: &'static str, raw: String) -> BlogResult<Option<String>> {
    let url = raw.trim();
    if url.is_empty() {
        return Ok(None);
    }
    check_len(field, url, MAX_URL_LEN)?;
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(BlogError::validation(field, "Enter a valid URL."));
    }
    Ok(Some(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick() {
        assert_eq!(pick(Some("x".to_string()), true), Some("x".to_string()));
        assert_eq!(pick::<String>(None, true), None);
        assert_eq!(pick::<String>(None, false), Some(String::new()));
    }

    #[test]
    fn test_optional_url() {
        assert_eq!(optional_url("u", "  ".to_string()).unwrap(), None);
        assert_eq!(
            optional_url("u", "https://cdn.example.com/a.png".to_string()).unwrap(),
            Some("https://cdn.example.com/a.png".to_string())
        );
        assert!(optional_url("u", "javascript:alert(1)".to_string()).is_err());
    }
}
