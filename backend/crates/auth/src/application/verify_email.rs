//! Verify Email Use Case

use std::sync::Arc;

use platform::client::ClientInfo;

use crate::domain::entity::{
    security_log::{AuditAction, AuditLog},
    verification_token::{EmailVerificationToken, TokenRedemption},
};
use crate::domain::repository::{
    SecurityLogRepository, UserRepository, VerificationTokenRepository,
};
use crate::error::{AuthError, AuthResult};

pub struct VerifyEmailUseCase<R>
where
    R: UserRepository + VerificationTokenRepository + SecurityLogRepository,
{
    repo: Arc<R>,
}

impl<R> VerifyEmailUseCase<R>
where
    R: UserRepository + VerificationTokenRepository + SecurityLogRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Consume the token and mark the owner's email verified.
    pub async fn execute(&self, token: &str, client: &ClientInfo) -> AuthResult<()> {
        let hash = EmailVerificationToken::hash(token);
        let user_id = match self.repo.redeem_verification_token(&hash).await? {
            TokenRedemption::Redeemed(user_id) => user_id,
            TokenRedemption::Expired => return Err(AuthError::TokenExpired),
            TokenRedemption::Missing => return Err(AuthError::InvalidToken),
        };

        let flipped = self.repo.mark_email_verified(user_id).await?;
        self.repo
            .record_audit(&AuditLog::new(
                AuditAction::EmailVerify,
                Some(user_id),
                Some(client),
                serde_json::json!({}),
            ))
            .await?;

        tracing::info!(user_id = %user_id, flipped, "Email verified");
        Ok(())
    }
}
