//! Blog Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, HTML services, repository traits
//! - `application/` - Use cases, cache keys, throttles and background jobs
//! - `infra/` - Database and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs and router
//!
//! ## Features
//! - Cached public list and detail pages with full-text search
//! - Comments with staff moderation; reactions with anonymous dedup
//! - Staff CRUD for posts, taxonomy and media, bulk status actions
//! - View analytics and a sitemap
//!
//! Post and comment HTML is sanitized on write and never trusted on read.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::BlogConfig;
pub use application::jobs::{BlogJob, BlogJobHandler};
pub use error::{BlogError, BlogResult};
pub use infra::{InMemoryBlogRepository, PgBlogRepository};
pub use presentation::router::{blog_router, blog_router_generic, sitemap_router};
