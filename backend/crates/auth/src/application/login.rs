//! Login Use Case
//!
//! Credentials check, optional second factor, then token issuance.
//!
//! Every attempt writes exactly one login history row. Second-factor failures
//! also write a `login_failed` audit entry.

use std::sync::Arc;

use chrono::Utc;
use platform::client::ClientInfo;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::tokens::{issue_access_token, sign_refresh_token};
use crate::domain::entity::{
    auth_session::AuthSession,
    security_log::{AuditAction, AuditLog, LoginHistory},
    two_factor::TwoFactorDevice,
    user::User,
};
use crate::domain::repository::AuthStore;
use crate::domain::value_object::{backup_code::BackupCode, email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

const REASON_INVALID_CREDENTIALS: &str = "invalid_credentials";
const REASON_SECOND_FACTOR: &str = "2FA required/invalid";

/// Login input
pub struct LoginInput {
    /// Email, or username when there is no `@`
    pub identifier: String,
    pub password: String,
    pub totp_code: Option<String>,
}

/// Login output
pub struct LoginOutput {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// How the second factor was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SecondFactor {
    NotRequired,
    Totp,
    BackupCode,
}

impl SecondFactor {
    fn as_str(self) -> &'static str {
        match self {
            SecondFactor::NotRequired => "password",
            SecondFactor::Totp => "totp",
            SecondFactor::BackupCode => "backup_code",
        }
    }
}

/// Login use case
pub struct LoginUseCase<R: AuthStore> {
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R: AuthStore> LoginUseCase<R> {
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: LoginInput, client: &ClientInfo) -> AuthResult<LoginOutput> {
        // CREDENTIALS_CHECK
        let user = self.resolve_user(&input.identifier).await?;
        let password = ClearTextPassword::for_verification(input.password);

        let Some(mut user) = user else {
            return self.reject_credentials(None, client).await;
        };
        let Some(credential) = self.repo.find_credential(user.user_id).await? else {
            return self.reject_credentials(Some(&user), client).await;
        };
        if !credential.verify(&password, self.config.pepper()) || !user.can_login() {
            return self.reject_credentials(Some(&user), client).await;
        }

        if credential.password_hash.needs_rehash() {
            let mut credential = credential;
            credential.update_password(password.hash(self.config.pepper())?);
            self.repo.update_credential(&credential).await?;
            tracing::info!(user_id = %user.user_id, "Password hash upgraded");
        }

        // 2FA_REQUIRED / 2FA_CHECK
        let factor = self
            .check_second_factor(&user, input.totp_code.as_deref().unwrap_or_default())
            .await?;
        let Some(factor) = factor else {
            self.repo
                .record_login_attempt(&LoginHistory::failure(
                    Some(user.user_id),
                    client,
                    REASON_SECOND_FACTOR,
                ))
                .await?;
            self.repo
                .record_audit(&AuditLog::new(
                    AuditAction::LoginFailed,
                    Some(user.user_id),
                    Some(client),
                    serde_json::json!({ "reason": REASON_SECOND_FACTOR }),
                ))
                .await?;
            return Err(AuthError::TwoFactorRequired);
        };

        // ISSUE_TOKENS
        let session = AuthSession::new(user.user_id, client, self.config.refresh_token_ttl_chrono());
        self.repo.create_session(&session).await?;
        let access_token = issue_access_token(&self.config, &user, session.session_id)?;
        let refresh_token = sign_refresh_token(&self.config, session.session_id);

        let now = Utc::now();
        self.repo.update_last_login(user.user_id, now).await?;
        user.last_login_at = Some(now);
        user.updated_at = now;
        self.repo
            .record_login_attempt(&LoginHistory::success(user.user_id, client))
            .await?;
        self.repo
            .record_audit(&AuditLog::new(
                AuditAction::LoginSuccess,
                Some(user.user_id),
                Some(client),
                serde_json::json!({ "method": factor.as_str() }),
            ))
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            method = factor.as_str(),
            "Login succeeded"
        );

        Ok(LoginOutput {
            access_token,
            refresh_token,
            user,
        })
    }

    async fn resolve_user(&self, identifier: &str) -> AuthResult<Option<User>> {
        let identifier = identifier.trim();
        if identifier.contains('@') {
            match Email::new(identifier) {
                Ok(email) => self.repo.find_by_email(&email).await,
                Err(_) => Ok(None),
            }
        } else {
            match UserName::new(identifier) {
                Ok(username) => self.repo.find_by_username(&username).await,
                Err(_) => Ok(None),
            }
        }
    }

    async fn reject_credentials(
        &self,
        user: Option<&User>,
        client: &ClientInfo,
    ) -> AuthResult<LoginOutput> {
        let entry = LoginHistory::failure(
            user.map(|u| u.user_id),
            client,
            REASON_INVALID_CREDENTIALS,
        );
        self.repo.record_login_attempt(&entry).await?;
        Err(AuthError::InvalidCredentials)
    }

    /// `None` when a second factor is required and was not satisfied.
    async fn check_second_factor(&self, user: &User, code: &str) -> AuthResult<Option<SecondFactor>> {
        let devices: Vec<TwoFactorDevice> = self
            .repo
            .list_devices(user.user_id)
            .await?
            .into_iter()
            .filter(|d| d.confirmed)
            .collect();
        if devices.is_empty() {
            return Ok(Some(SecondFactor::NotRequired));
        }

        let code = code.trim();
        for device in &devices {
            if device.secret.verify(code).unwrap_or(false) {
                return Ok(Some(SecondFactor::Totp));
            }
        }

        if !code.is_empty() {
            let hash = BackupCode::from_input(code).hash(&self.config.backup_code_key());
            if self.repo.redeem_backup_code(user.user_id, &hash).await? {
                tracing::info!(user_id = %user.user_id, "Backup code redeemed");
                return Ok(Some(SecondFactor::BackupCode));
            }
        }
        Ok(None)
    }
}
