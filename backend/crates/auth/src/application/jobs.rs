//! Background jobs
//!
//! Side effects that must not hold up or fail the request: outbound mail,
//! data export and deferred deactivation. Jobs may be dropped or repeated;
//! each one is safe to run twice.

use std::fmt;
use std::sync::Arc;

use kernel::id::UserId;
use kernel::pagination::PageRequest;
use platform::mail::{Email, Mailer};
use platform::tasks::{JobError, JobHandler};

use crate::application::config::AuthConfig;
use crate::domain::repository::AuthStore;

/// Login history rows included in a data export
const EXPORT_LOGIN_HISTORY_LIMIT: u32 = 100;

#[derive(Clone)]
pub enum AuthJob {
    SendVerificationEmail {
        email: String,
        token: String,
    },
    SendPasswordReset {
        email: String,
        uid: UserId,
        token: String,
    },
    ExportAccountData {
        user_id: UserId,
    },
    DeactivateAccount {
        user_id: UserId,
    },
}

// Tokens never reach the logs
impl fmt::Debug for AuthJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthJob::SendVerificationEmail { email, .. } => f
                .debug_struct("SendVerificationEmail")
                .field("email", email)
                .finish_non_exhaustive(),
            AuthJob::SendPasswordReset { email, uid, .. } => f
                .debug_struct("SendPasswordReset")
                .field("email", email)
                .field("uid", uid)
                .finish_non_exhaustive(),
            AuthJob::ExportAccountData { user_id } => f
                .debug_struct("ExportAccountData")
                .field("user_id", user_id)
                .finish(),
            AuthJob::DeactivateAccount { user_id } => f
                .debug_struct("DeactivateAccount")
                .field("user_id", user_id)
                .finish(),
        }
    }
}

pub struct AuthJobHandler<R, M>
where
    R: AuthStore,
    M: Mailer,
{
    repo: Arc<R>,
    mailer: M,
    config: Arc<AuthConfig>,
}

impl<R, M> AuthJobHandler<R, M>
where
    R: AuthStore,
    M: Mailer,
{
    pub fn new(repo: Arc<R>, mailer: M, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            mailer,
            config,
        }
    }

    async fn send(&self, email: Email) -> Result<(), JobError> {
        self.mailer.send(email).await.map_err(JobError::new)
    }

    async fn export(&self, user_id: UserId) -> Result<(), JobError> {
        let Some(user) = self.repo.find_by_id(user_id).await.map_err(JobError::new)? else {
            tracing::debug!(user_id = %user_id, "Export skipped, user is gone");
            return Ok(());
        };
        let profile = self.repo.find_profile(user_id).await.map_err(JobError::new)?;
        let (history, _) = self
            .repo
            .list_login_history(
                Some(user_id),
                PageRequest::new(Some(1), Some(EXPORT_LOGIN_HISTORY_LIMIT)),
            )
            .await
            .map_err(JobError::new)?;

        let document = serde_json::json!({
            "user": {
                "id": user.user_id,
                "email": user.email.as_str(),
                "username": user.username.as_ref().map(|u| u.as_str()),
                "first_name": user.first_name,
                "last_name": user.last_name,
                "phone_number": user.phone_number,
                "email_verified": user.email_verified,
                "date_joined": user.created_at,
                "last_login": user.last_login_at,
            },
            "profile": profile.map(|p| serde_json::json!({
                "bio": p.bio,
                "avatar_url": p.avatar_url,
                "location": p.location,
                "timezone": p.timezone,
                "language": p.language,
                "privacy_settings": p.privacy_settings,
                "preferences": p.preferences,
            })),
            "login_history": history,
        });
        let body = serde_json::to_string_pretty(&document).map_err(JobError::new)?;

        self.send(Email {
            to: user.email.to_string(),
            subject: "Your data export".to_string(),
            body,
        })
        .await?;
        tracing::info!(user_id = %user_id, "Account data exported");
        Ok(())
    }

    async fn deactivate(&self, user_id: UserId) -> Result<(), JobError> {
        let was_active = self.repo.deactivate(user_id).await.map_err(JobError::new)?;
        let revoked = self
            .repo
            .delete_sessions_for_user(user_id)
            .await
            .map_err(JobError::new)?;
        tracing::info!(
            user_id = %user_id,
            was_active,
            sessions_revoked = revoked,
            "Account deactivated"
        );
        Ok(())
    }
}

impl<R, M> JobHandler<AuthJob> for AuthJobHandler<R, M>
where
    R: AuthStore,
    M: Mailer,
{
    async fn handle(&self, job: AuthJob) -> Result<(), JobError> {
        match job {
            AuthJob::SendVerificationEmail { email, token } => {
                let link = format!("{}/verify-email?token={}", self.config.frontend_url, token);
                self.send(Email {
                    to: email,
                    subject: "Verify your email address".to_string(),
                    body: format!("Confirm your address by opening {link}"),
                })
                .await
            }
            AuthJob::SendPasswordReset { email, uid, token } => {
                let link = format!(
                    "{}/reset-password?uid={}&token={}",
                    self.config.frontend_url, uid, token
                );
                self.send(Email {
                    to: email,
                    subject: "Password reset".to_string(),
                    body: format!("Reset your password by opening {link}"),
                })
                .await
            }
            AuthJob::ExportAccountData { user_id } => self.export(user_id).await,
            AuthJob::DeactivateAccount { user_id } => self.deactivate(user_id).await,
        }
    }
}
