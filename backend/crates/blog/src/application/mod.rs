//! Application Layer
//!
//! Use cases and application services.

pub mod admin_content;
pub mod admin_posts;
pub mod cache_keys;
pub mod comments;
pub mod config;
pub mod jobs;
pub mod public_posts;
pub mod reactions;
pub mod throttle;
pub mod views;

// Re-exports
pub use admin_content::{AdminContentUseCase, CategoryInput, MediaInput, TagInput, registry};
pub use admin_posts::{AdminPostsUseCase, PostInput, WriteMode};
pub use comments::{CommentInput, CommentsUseCase};
pub use config::BlogConfig;
pub use jobs::{BlogJob, BlogJobHandler};
pub use public_posts::PublicPostsUseCase;
pub use reactions::{ReactionOutcome, ReactionsUseCase, Reactor};
pub use views::{PostDetail, PostListItem, PublicComment, TaxonomyBrief};
