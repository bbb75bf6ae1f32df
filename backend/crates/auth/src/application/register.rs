//! Register Use Case
//!
//! Creates a user with credential and profile, then queues the verification
//! email.

use std::sync::Arc;

use platform::client::ClientInfo;
use platform::password::{ClearTextPassword, PasswordHashError, PasswordPolicyError};
use platform::tasks::TaskQueue;

use crate::application::config::AuthConfig;
use crate::application::jobs::AuthJob;
use crate::domain::entity::{
    credential::Credential, profile::Profile, user::User,
    verification_token::EmailVerificationToken,
};
use crate::domain::repository::{UserRepository, VerificationTokenRepository};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub username: Option<String>,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: UserRepository + VerificationTokenRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    jobs: TaskQueue<AuthJob>,
}

impl<R> RegisterUseCase<R>
where
    R: UserRepository + VerificationTokenRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, jobs: TaskQueue<AuthJob>) -> Self {
        Self { repo, config, jobs }
    }

    pub async fn execute(&self, input: RegisterInput, client: &ClientInfo) -> AuthResult<User> {
        let email = Email::new(&input.email)?;
        let username = match input.username.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                UserName::new(raw).map_err(|e| AuthError::validation("username", e.to_string()))?,
            ),
            _ => None,
        };
        let password = ClearTextPassword::new(input.password)?;
        ensure_not_breached(&self.config, &password).await?;

        if self.repo.exists_by_email(&email).await? {
            return Err(AuthError::validation(
                "email",
                "A user with this email already exists.",
            ));
        }
        if let Some(username) = &username {
            if self.repo.exists_by_username(username, None).await? {
                return Err(AuthError::validation(
                    "username",
                    "A user with that username already exists.",
                ));
            }
        }

        let password_hash = password.hash(self.config.pepper())?;

        let mut user = User::new(email, username);
        user.first_name = input.first_name.unwrap_or_default().trim().to_string();
        user.last_name = input.last_name.unwrap_or_default().trim().to_string();
        let credential = Credential::new(user.user_id, password_hash);
        let profile = Profile::new(user.user_id);

        self.repo.create_account(&user, &credential, &profile).await?;

        let (token, plaintext) =
            EmailVerificationToken::issue(user.user_id, self.config.verification_token_ttl_chrono());
        self.repo.create_verification_token(&token).await?;
        self.jobs.dispatch(AuthJob::SendVerificationEmail {
            email: user.email.to_string(),
            token: plaintext,
        });

        tracing::info!(
            user_id = %user.user_id,
            ip = ?client.ip,
            "User registered"
        );
        Ok(user)
    }
}

/// Reject passwords from the HIBP corpus when the check is enabled.
///
/// An unreachable HIBP service never blocks the caller.
pub(crate) async fn ensure_not_breached(
    config: &AuthConfig,
    password: &ClearTextPassword,
) -> AuthResult<()> {
    if !config.check_breached_passwords {
        return Ok(());
    }
    match password.check_breach().await {
        Ok(true) => Err(PasswordPolicyError::Compromised.into()),
        Ok(false) => Ok(()),
        Err(PasswordHashError::BreachCheckFailed(e)) => {
            tracing::warn!(error = %e, "Breach check unavailable, continuing");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
