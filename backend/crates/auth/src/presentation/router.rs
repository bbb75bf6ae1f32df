//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use platform::tasks::TaskQueue;
use std::sync::Arc;

use crate::application::AuthJob;
use crate::application::config::AuthConfig;
use crate::domain::repository::AuthStore;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(
    repo: Arc<PgAuthRepository>,
    config: Arc<AuthConfig>,
    jobs: TaskQueue<AuthJob>,
) -> Router {
    auth_router_generic(repo, config, jobs)
}

/// Create a generic Auth router for any repository implementation
///
/// Paths are relative; the binary nests them under `/api/v1`.
pub fn auth_router_generic<R: AuthStore>(
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    jobs: TaskQueue<AuthJob>,
) -> Router {
    let state = AuthAppState { repo, config, jobs };

    Router::new()
        .route("/auth/register", post(handlers::register::<R>))
        .route("/auth/login", post(handlers::login::<R>))
        .route("/auth/logout", post(handlers::logout::<R>))
        .route("/auth/token/refresh", post(handlers::refresh::<R>))
        .route("/auth/email-verify", post(handlers::email_verify::<R>))
        .route("/auth/password-reset", post(handlers::password_reset::<R>))
        .route(
            "/auth/password-reset/confirm",
            post(handlers::password_reset_confirm::<R>),
        )
        .route(
            "/users/me",
            get(handlers::me::<R>)
                .put(handlers::me_replace::<R>)
                .patch(handlers::me_patch::<R>)
                .delete(handlers::request_deletion::<R>),
        )
        .route("/users/me/export", post(handlers::request_export::<R>))
        .route(
            "/users/me/2fa",
            get(handlers::list_devices::<R>)
                .post(handlers::initiate_two_factor::<R>)
                .delete(handlers::disable_two_factor::<R>),
        )
        .route("/users/me/2fa/confirm", post(handlers::confirm_two_factor::<R>))
        .route(
            "/users/me/2fa/backup-codes",
            post(handlers::regenerate_backup_codes::<R>),
        )
        .route("/users", get(handlers::list_users::<R>))
        .route("/users/{id}", get(handlers::get_user::<R>))
        .route("/admin/audit-logs", get(handlers::list_audit_logs::<R>))
        .route("/admin/login-history", get(handlers::list_login_history::<R>))
        .with_state(state)
}
