//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use auth::domain::repository::SessionRepository;
use auth::{AuthJobHandler, AuthMiddlewareState, PgAuthRepository, auth_router, authenticate};
use axum::{
    Extension, Router, middleware,
    http::{Method, header},
};
use blog::{BlogJobHandler, PgBlogRepository, blog_router, sitemap_router};
use platform::cache::CacheService;
use platform::client::ClientIpSource;
use platform::mail::{LogMailer, Mailer, WebhookMailer};
use platform::tasks::{DEFAULT_QUEUE_CAPACITY, TaskQueue};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,blog=info,platform=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_repo = Arc::new(PgAuthRepository::new(pool.clone()));
    let blog_repo = Arc::new(PgBlogRepository::new(pool.clone()));

    // Startup cleanup: errors here should not prevent server startup
    match auth_repo.cleanup_expired_sessions().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Auth session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Auth session cleanup failed, continuing anyway");
        }
    }

    let cache = build_cache(&config).await?;

    let mailer: Arc<dyn Mailer> = match &config.mail_webhook_url {
        Some(url) => Arc::new(WebhookMailer::new(url.clone())),
        None => {
            tracing::info!("MAIL_WEBHOOK_URL not set, emails go to the log");
            Arc::new(LogMailer)
        }
    };

    let auth_config = Arc::new(config.auth.clone());
    let blog_config = Arc::new(config.blog.clone());

    // Background workers
    let auth_jobs = TaskQueue::spawn(
        "auth",
        DEFAULT_QUEUE_CAPACITY,
        AuthJobHandler::new(auth_repo.clone(), mailer, auth_config.clone()),
    );
    let blog_jobs = TaskQueue::spawn(
        "blog",
        DEFAULT_QUEUE_CAPACITY,
        BlogJobHandler::new(blog_repo.clone(), cache.clone()),
    );

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origins())
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    let auth_state = AuthMiddlewareState::new(auth_repo.clone(), auth_config.clone());

    // Build router
    let app = Router::new()
        .nest(
            "/api/v1",
            auth_router(auth_repo.clone(), auth_config, auth_jobs),
        )
        .nest(
            "/api",
            blog_router(
                blog_repo.clone(),
                cache.clone(),
                blog_config.clone(),
                blog_jobs.clone(),
            ),
        )
        .merge(sitemap_router(blog_repo, cache, blog_config, blog_jobs))
        .layer(middleware::from_fn_with_state(
            auth_state,
            authenticate::<PgAuthRepository>,
        ))
        .layer(Extension(ClientIpSource::from_trust(
            config.trust_forwarded_for,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(feature = "redis")]
async fn build_cache(config: &AppConfig) -> anyhow::Result<CacheService> {
    match &config.redis_url {
        Some(url) => {
            let backend = platform::cache::RedisCache::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Using Redis cache");
            Ok(CacheService::new(backend))
        }
        None => Ok(CacheService::in_memory()),
    }
}

#[cfg(not(feature = "redis"))]
async fn build_cache(config: &AppConfig) -> anyhow::Result<CacheService> {
    if config.redis_url.is_some() {
        tracing::warn!("REDIS_URL is set but the redis feature is off, using in-memory cache");
    }
    Ok(CacheService::in_memory())
}
