//! Reaction use cases
//!
//! Authenticated callers are deduplicated by the store's unique triple.
//! Anonymous callers are deduplicated by an atomic `set_if_absent` marker
//! keyed by their `anon_sid` cookie; the marker is released when the insert
//! fails so a retry can succeed.

use std::sync::Arc;

use chrono::Utc;
use kernel::Principal;
use platform::cache::CacheService;
use platform::client::ClientInfo;

use crate::application::cache_keys::anon_reaction_key;
use crate::application::config::BlogConfig;
use crate::application::public_posts::evict;
use crate::application::throttle::{self, ThrottleScope};
use crate::domain::entities::Reaction;
use crate::domain::repository::{PostRepository, ReactionRepository};
use crate::domain::value_objects::ReactionType;
use crate::error::{BlogError, BlogResult};

/// Who is reacting
#[derive(Debug, Clone, Copy)]
pub enum Reactor<'a> {
    User(&'a Principal),
    /// Value of the anonymous session cookie
    Anonymous(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// A reaction is recorded for the caller
    Recorded,
    /// Anonymous repeat inside the dedup window; nothing written
    Duplicate,
}

pub struct ReactionsUseCase<R>
where
    R: PostRepository + ReactionRepository,
{
    repo: Arc<R>,
    cache: CacheService,
    config: Arc<BlogConfig>,
}

impl<R> ReactionsUseCase<R>
where
    R: PostRepository + ReactionRepository,
{
    pub fn new(repo: Arc<R>, cache: CacheService, config: Arc<BlogConfig>) -> Self {
        Self {
            repo,
            cache,
            config,
        }
    }

    pub async fn react(
        &self,
        slug: &str,
        reaction_type: ReactionType,
        reactor: Reactor<'_>,
        client: &ClientInfo,
    ) -> BlogResult<ReactionOutcome> {
        let principal = match reactor {
            Reactor::User(p) => Some(p),
            Reactor::Anonymous(_) => None,
        };
        throttle::enforce(
            &self.cache,
            ThrottleScope {
                name: "reactions",
                anon: &self.config.reaction_anon_limit,
                user: &self.config.reaction_user_limit,
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

        match reactor {
            Reactor::User(principal) => {
                let reaction = Reaction::new(post.id, Some(principal.user_id), reaction_type);
                let inserted = self.repo.add_reaction(&reaction).await?;
                tracing::debug!(post_id = %post.id, user_id = %principal.user_id, inserted, "Reaction");
                Ok(ReactionOutcome::Recorded)
            }
            Reactor::Anonymous(session) => {
                let key = anon_reaction_key(session, &post.id, reaction_type.as_str());
                let fresh = self
                    .cache
                    .set_if_absent(&key, "1", self.config.anon_reaction_ttl)
                    .await?;
                if !fresh {
                    return Ok(ReactionOutcome::Duplicate);
                }

                let reaction = Reaction::new(post.id, None, reaction_type);
                if let Err(e) = self.repo.add_reaction(&reaction).await {
                    evict(&self.cache, &key).await;
                    return Err(e);
                }
                tracing::debug!(post_id = %post.id, "Anonymous reaction");
                Ok(ReactionOutcome::Recorded)
            }
        }
    }

    /// Remove the caller's reaction. Anonymous reactions cannot be taken back.
    pub async fn unreact(
        &self,
        slug: &str,
        reaction_type: ReactionType,
        principal: Option<&Principal>,
    ) -> BlogResult<()> {
        let post = self
            .repo
            .find_public_by_slug(slug, Utc::now())
            .await?
            .ok_or(BlogError::NotFound)?;

        if let Some(principal) = principal {
            self.repo
                .remove_reaction(post.id, principal.user_id, reaction_type)
                .await?;
        }
        Ok(())
    }
}
