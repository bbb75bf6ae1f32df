//! Password Reset Use Cases
//!
//! Request never reveals whether an address is registered; confirm answers
//! unknown users and bad tokens the same way.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;
use platform::client::ClientInfo;
use platform::password::ClearTextPassword;
use platform::tasks::TaskQueue;

use crate::application::config::AuthConfig;
use crate::application::jobs::AuthJob;
use crate::application::register::ensure_not_breached;
use crate::application::tokens::{check_password_reset_token, make_password_reset_token};
use crate::domain::entity::security_log::{AuditAction, AuditLog};
use crate::domain::repository::{
    CredentialRepository, SecurityLogRepository, SessionRepository, UserRepository,
};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Request
// ============================================================================

pub struct RequestPasswordResetUseCase<R>
where
    R: UserRepository + CredentialRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    jobs: TaskQueue<AuthJob>,
}

impl<R> RequestPasswordResetUseCase<R>
where
    R: UserRepository + CredentialRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, jobs: TaskQueue<AuthJob>) -> Self {
        Self { repo, config, jobs }
    }

    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let Ok(email) = Email::new(email) else {
            return Ok(());
        };
        let Some(user) = self.repo.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown address");
            return Ok(());
        };
        if !user.can_login() {
            return Ok(());
        }
        let Some(credential) = self.repo.find_credential(user.user_id).await? else {
            return Ok(());
        };

        let token = make_password_reset_token(&self.config, &user, &credential, Utc::now());
        self.jobs.dispatch(AuthJob::SendPasswordReset {
            email: user.email.to_string(),
            uid: user.user_id,
            token,
        });
        tracing::info!(user_id = %user.user_id, "Password reset link queued");
        Ok(())
    }
}

// ============================================================================
// Confirm
// ============================================================================

pub struct ConfirmPasswordResetInput {
    pub uid: String,
    pub token: String,
    pub new_password: String,
}

pub struct ConfirmPasswordResetUseCase<R>
where
    R: UserRepository + CredentialRepository + SessionRepository + SecurityLogRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> ConfirmPasswordResetUseCase<R>
where
    R: UserRepository + CredentialRepository + SessionRepository + SecurityLogRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        input: ConfirmPasswordResetInput,
        client: &ClientInfo,
    ) -> AuthResult<()> {
        let user_id: UserId = input.uid.trim().parse().map_err(|_| AuthError::InvalidToken)?;
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        let mut credential = self
            .repo
            .find_credential(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let now = Utc::now();
        if !check_password_reset_token(&self.config, &user, &credential, input.token.trim(), now) {
            self.audit(user_id, client, "failed").await?;
            return Err(AuthError::InvalidToken);
        }

        let password = ClearTextPassword::new(input.new_password)
            .map_err(|e| AuthError::validation("new_password", e.to_string()))?;
        ensure_not_breached(&self.config, &password)
            .await
            .map_err(|e| match e {
                AuthError::Validation { message, .. } => {
                    AuthError::validation("new_password", message)
                }
                other => other,
            })?;

        credential.update_password(password.hash(self.config.pepper())?);
        self.repo.update_credential(&credential).await?;
        let revoked = self.repo.delete_sessions_for_user(user_id).await?;
        self.audit(user_id, client, "success").await?;

        tracing::info!(user_id = %user_id, sessions_revoked = revoked, "Password reset");
        Ok(())
    }

    async fn audit(&self, user_id: UserId, client: &ClientInfo, status: &str) -> AuthResult<()> {
        self.repo
            .record_audit(&AuditLog::new(
                AuditAction::PasswordReset,
                Some(user_id),
                Some(client),
                serde_json::json!({ "status": status }),
            ))
            .await
    }
}
