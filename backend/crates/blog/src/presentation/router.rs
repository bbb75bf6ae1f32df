//! Blog Router

use axum::{
    Router,
    routing::{delete, get, post},
};
use platform::cache::CacheService;
use platform::tasks::TaskQueue;
use std::sync::Arc;

use crate::application::{BlogConfig, BlogJob};
use crate::domain::repository::BlogStore;
use crate::infra::postgres::PgBlogRepository;
use crate::presentation::admin_handlers as admin;
use crate::presentation::handlers::{self, BlogAppState};

/// Create the Blog router with PostgreSQL repository
pub fn blog_router(
    repo: Arc<PgBlogRepository>,
    cache: CacheService,
    config: Arc<BlogConfig>,
    jobs: TaskQueue<BlogJob>,
) -> Router {
    blog_router_generic(repo, cache, config, jobs)
}

/// Create a generic Blog router for any repository implementation
///
/// Paths are relative; the binary nests them under `/api`.
pub fn blog_router_generic<R: BlogStore>(
    repo: Arc<R>,
    cache: CacheService,
    config: Arc<BlogConfig>,
    jobs: TaskQueue<BlogJob>,
) -> Router {
    let state = BlogAppState {
        repo,
        cache,
        config,
        jobs,
    };

    Router::new()
        // Public
        .route("/blogs", get(handlers::list_posts::<R>))
        .route("/blogs/{slug}", get(handlers::get_post::<R>))
        .route(
            "/blogs/{slug}/comments",
            get(handlers::list_comments::<R>).post(handlers::create_comment::<R>),
        )
        .route(
            "/blogs/{slug}/reactions",
            post(handlers::react::<R>).delete(handlers::unreact::<R>),
        )
        .route("/categories", get(handlers::list_categories::<R>))
        .route("/tags", get(handlers::list_tags::<R>))
        // Admin
        .route(
            "/admin/blogs",
            get(admin::list_posts::<R>).post(admin::create_post::<R>),
        )
        .route("/admin/blogs/analytics", get(admin::analytics::<R>))
        .route("/admin/blogs/actions/{action}", post(admin::bulk_action::<R>))
        .route(
            "/admin/blogs/{slug}",
            get(admin::get_post::<R>)
                .put(admin::replace_post::<R>)
                .patch(admin::patch_post::<R>)
                .delete(admin::delete_post::<R>),
        )
        .route("/admin/comments", get(admin::list_comments::<R>))
        .route("/admin/comments/approve", post(admin::approve_comments::<R>))
        .route("/admin/comments/{id}", delete(admin::delete_comment::<R>))
        .route(
            "/admin/categories",
            get(admin::list_categories::<R>).post(admin::create_category::<R>),
        )
        .route("/admin/categories/{slug}", delete(admin::delete_category::<R>))
        .route(
            "/admin/tags",
            get(admin::list_tags::<R>).post(admin::create_tag::<R>),
        )
        .route("/admin/tags/{slug}", delete(admin::delete_tag::<R>))
        .route(
            "/admin/media",
            get(admin::list_media::<R>).post(admin::create_media::<R>),
        )
        .route("/admin/media/{id}", delete(admin::delete_media::<R>))
        .route("/admin/registry", get(admin::admin_registry))
        .with_state(state)
}

/// `/sitemap.xml`, mounted at the site root
pub fn sitemap_router<R: BlogStore>(
    repo: Arc<R>,
    cache: CacheService,
    config: Arc<BlogConfig>,
    jobs: TaskQueue<BlogJob>,
) -> Router {
    let state = BlogAppState {
        repo,
        cache,
        config,
        jobs,
    };

    Router::new()
        .route("/sitemap.xml", get(handlers::sitemap::<R>))
        .with_state(state)
}
