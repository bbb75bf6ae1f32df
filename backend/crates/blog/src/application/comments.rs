//! Public comment use cases

use std::sync::Arc;

use chrono::Utc;
use kernel::Principal;
use kernel::id::CommentId;
use platform::cache::CacheService;
use platform::client::ClientInfo;
use platform::crypto::sha256_hex;

use crate::application::config::BlogConfig;
use crate::application::throttle::{self, ThrottleScope};
use crate::application::views::PublicComment;
use crate::domain::entities::Comment;
use crate::domain::repository::{CommentRepository, PostRepository};
use crate::domain::services::sanitize_comment_html;
use crate::error::{BlogError, BlogResult};

const MAX_AUTHOR_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct CommentInput {
    pub content: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub parent_id: Option<CommentId>,
}

pub struct CommentsUseCase<R>
where
    R: PostRepository + CommentRepository,
{
    repo: Arc<R>,
    cache: CacheService,
    config: Arc<BlogConfig>,
}

impl<R> CommentsUseCase<R>
where
    R: PostRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>, cache: CacheService, config: Arc<BlogConfig>) -> Self {
        Self {
            repo,
            cache,
            config,
        }
    }

    /// Approved comments of a public post, oldest first.
    pub async fn list(&self, slug: &str) -> BlogResult<Vec<PublicComment>> {
        let post = self
            .repo
            .find_public_by_slug(slug, Utc::now())
            .await?
            .ok_or(BlogError::NotFound)?;
        let comments = self.repo.list_approved(post.id).await?;
        Ok(comments.iter().map(PublicComment::from).collect())
    }

    /// Store a comment; only staff comments are approved immediately.
    pub async fn submit(
        &self,
        slug: &str,
        input: CommentInput,
        principal: Option<&Principal>,
        client: &ClientInfo,
    ) -> BlogResult<()> {
        throttle::enforce(
            &self.cache,
            ThrottleScope {
                name: "comments",
                anon: &self.config.comment_anon_limit,
                user: &self.config.comment_user_limit,
            },
            principal,
            client,
        )
        .await?;

        let post = self
            .repo
            .find_public_by_slug(slug, Utc::now())
            .await?
            .ok_or(BlogError::NotFound)?;
        if !post.allow_comments {
            return Err(BlogError::CommentsDisabled);
        }

        let content = sanitize_comment_html(input.content.trim());
        if content.trim().is_empty() {
            return Err(BlogError::validation("content", "This field may not be blank."));
        }

        let author_name = input
            .author_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if author_name
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_AUTHOR_NAME_LEN)
        {
            return Err(BlogError::validation(
                "author_name",
                format!("Ensure this field has no more than {MAX_AUTHOR_NAME_LEN} characters."),
            ));
        }

        let author_email_hash = match input.author_email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(email) if email.contains('@') => {
                Some(sha256_hex(email.to_lowercase().as_bytes()))
            }
            Some(_) => {
                return Err(BlogError::validation(
                    "author_email",
                    "Enter a valid email address.",
                ));
            }
        };

        if let Some(parent_id) = input.parent_id {
            let parent = self.repo.find_comment(parent_id).await?;
            if parent.is_none_or(|p| p.post_id != post.id) {
                return Err(BlogError::validation(
                    "parent_id",
                    "Parent comment must belong to the same post.",
                ));
            }
        }

        let comment = Comment {
            id: CommentId::new(),
            post_id: post.id,
            author_id: principal.map(|p| p.user_id),
            author_label: principal.map(|p| p.display_name().to_string()),
            author_name,
            author_email_hash,
            parent_id: input.parent_id,
            content,
            is_approved: principal.is_some_and(|p| p.is_staff),
            created_at: Utc::now(),
        };
        self.repo.create_comment(&comment).await?;

        tracing::info!(
            post_id = %post.id,
            comment_id = %comment.id,
            approved = comment.is_approved,
            "Comment submitted"
        );
        Ok(())
    }
}
