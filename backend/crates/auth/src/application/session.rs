//! Session Use Cases
//!
//! Bearer authentication, refresh and logout over server-side sessions.

use std::sync::Arc;

use chrono::Utc;
use kernel::Principal;
use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::tokens::{decode_access_token, issue_access_token, parse_refresh_token};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Authenticate
// ============================================================================

/// Resolve a bearer access token into the calling principal.
///
/// The token must verify, its session must still exist and be unexpired, and
/// its user must be active.
pub struct AuthenticateUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, bearer: &str) -> AuthResult<Principal> {
        let claims = decode_access_token(&self.config, bearer)?;
        let user_id = claims.user_id()?;
        let session_id = claims.session_id()?;

        let session = self
            .repo
            .find_session(session_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or(AuthError::InvalidSession)?;

        let user = self
            .repo
            .find_by_id(session.user_id)
            .await?
            .filter(|u| u.can_login())
            .ok_or(AuthError::InvalidSession)?;

        Ok(user.principal())
    }
}

// ============================================================================
// Refresh
// ============================================================================

pub struct RefreshTokenUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> RefreshTokenUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Returns a fresh access token for the session behind `refresh`.
    pub async fn execute(&self, refresh: &str) -> AuthResult<String> {
        let session_id =
            parse_refresh_token(&self.config, refresh).ok_or(AuthError::InvalidSession)?;
        let session = self
            .repo
            .find_session(session_id)
            .await?
            .ok_or(AuthError::InvalidSession)?;
        let user = self
            .repo
            .find_by_id(session.user_id)
            .await?
            .filter(|u| u.can_login())
            .ok_or(AuthError::InvalidSession)?;

        self.repo.touch_session(session_id, Utc::now()).await?;
        let access = issue_access_token(&self.config, &user, session_id)?;

        tracing::debug!(user_id = %user.user_id, session_id = %session_id, "Access token refreshed");
        Ok(access)
    }
}

// ============================================================================
// Logout
// ============================================================================

pub struct LogoutUseCase<R: SessionRepository> {
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R: SessionRepository> LogoutUseCase<R> {
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Revoke the session behind `refresh` if it belongs to `user_id`.
    ///
    /// Unknown, forged or foreign tokens are ignored.
    pub async fn execute(&self, user_id: UserId, refresh: Option<&str>) -> AuthResult<()> {
        let Some(session_id) = refresh.and_then(|t| parse_refresh_token(&self.config, t)) else {
            tracing::debug!(user_id = %user_id, "Logout without a valid refresh token");
            return Ok(());
        };

        let revoked = self.repo.delete_session(session_id, user_id).await?;
        tracing::info!(user_id = %user_id, session_id = %session_id, revoked, "Logged out");
        Ok(())
    }
}
