//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, CommentId, MediaAssetId, PostId, ReactionId, TagId, UserId};

use crate::domain::value_objects::{PostStatus, ReactionType, Slug};

/// Post author as shown publicly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRef {
    pub id: UserId,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub parent_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String, slug: Slug, description: String, parent_id: Option<CategoryId>) -> Self {
        Self {
            id: CategoryId::new(),
            name,
            slug,
            description,
            parent_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: Slug,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: String, slug: Slug) -> Self {
        Self {
            id: TagId::new(),
            name,
            slug,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: Slug,
    pub summary: String,
    /// Sanitized HTML
    pub content: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub author: AuthorRef,
    pub category: Option<Category>,
    /// Ordered by name
    pub tags: Vec<Tag>,
    pub featured_image: Option<String>,
    pub canonical_url: Option<String>,
    pub meta_title: String,
    pub meta_description: String,
    pub reading_time_minutes: i32,
    pub views_count: i64,
    /// Derived: number of `like` reactions
    pub likes_count: i64,
    pub allow_comments: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Published and not scheduled for later.
    pub fn is_public(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Published && self.published_at.is_some_and(|at| at <= now)
    }

    /// Move to `status`, stamping `published_at` on first publication.
    pub fn set_status(&mut self, status: PostStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == PostStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }
}

/// Slim projection for analytics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostViews {
    pub title: String,
    pub slug: Slug,
    pub views_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub slug: Slug,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: Option<UserId>,
    /// Username or email of `author_id`, resolved on read
    pub author_label: Option<String>,
    pub author_name: Option<String>,
    /// SHA-256 hex of the normalized address
    pub author_email_hash: Option<String>,
    pub parent_id: Option<CommentId>,
    /// Sanitized HTML
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn author_display(&self) -> &str {
        self.author_label
            .as_deref()
            .or(self.author_name.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or("Anonymous")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub id: ReactionId,
    pub post_id: PostId,
    /// `None` for anonymous reactions
    pub user_id: Option<UserId>,
    pub reaction_type: ReactionType,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(post_id: PostId, user_id: Option<UserId>, reaction_type: ReactionType) -> Self {
        Self {
            id: ReactionId::new(),
            post_id,
            user_id,
            reaction_type,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub id: MediaAssetId,
    pub uploader_id: Option<UserId>,
    pub file_url: String,
    pub mime_type: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(status: PostStatus, published_at: Option<DateTime<Utc>>) -> Post {
        let now = Utc::now();
        Post {
            id: PostId::new(),
            title: "T".to_string(),
            slug: Slug::from_trusted("t"),
            summary: String::new(),
            content: String::new(),
            status,
            published_at,
            author: AuthorRef {
                id: UserId::new(),
                username: None,
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
        }
    }

    #[test]
    fn test_visibility() {
        let now = Utc::now();
        assert!(post(PostStatus::Published, Some(now - Duration::minutes(1))).is_public(now));
        assert!(!post(PostStatus::Published, Some(now + Duration::hours(1))).is_public(now));
        assert!(!post(PostStatus::Published, None).is_public(now));
        assert!(!post(PostStatus::Draft, Some(now)).is_public(now));
    }

    #[test]
    fn test_publish_stamps_once() {
        let now = Utc::now();
        let earlier = now - Duration::days(3);

        let mut fresh = post(PostStatus::Draft, None);
        fresh.set_status(PostStatus::Published, now);
        assert_eq!(fresh.published_at, Some(now));

        let mut scheduled = post(PostStatus::Draft, Some(earlier));
        scheduled.set_status(PostStatus::Published, now);
        assert_eq!(scheduled.published_at, Some(earlier));
    }

    #[test]
    fn test_comment_author_display() {
        let mut comment = Comment {
            id: CommentId::new(),
            post_id: PostId::new(),
            author_id: None,
            author_label: None,
            author_name: None,
            author_email_hash: None,
            parent_id: None,
            content: "hi".to_string(),
            is_approved: true,
            created_at: Utc::now(),
        };
        assert_eq!(comment.author_display(), "Anonymous");

        comment.author_name = Some("Guest".to_string());
        assert_eq!(comment.author_display(), "Guest");

        comment.author_label = Some("ada".to_string());
        assert_eq!(comment.author_display(), "ada");
    }
}
