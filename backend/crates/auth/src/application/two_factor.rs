//! Two-Factor Use Cases
//!
//! TOTP device enrollment, confirmation and removal, plus backup code
//! regeneration.

use std::sync::Arc;

use kernel::id::{DeviceId, UserId};
use platform::client::ClientInfo;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::{
    security_log::{AuditAction, AuditLog},
    two_factor::{BackupCodeRecord, TwoFactorDevice},
    user::User,
};
use crate::domain::repository::{
    CredentialRepository, SecurityLogRepository, TwoFactorRepository,
};
use crate::domain::value_object::backup_code::{
    BackupCode, DEFAULT_BACKUP_CODE_COUNT, MAX_BACKUP_CODE_COUNT,
};
use crate::error::{AuthError, AuthResult};

/// Enrollment output
pub struct EnrollmentOutput {
    pub device_id: DeviceId,
    /// Base32 secret for manual entry
    pub secret: String,
    pub otpauth_uri: String,
    /// Base64 PNG of the otpauth URI
    pub qr_code: String,
}

/// Two-factor use case
pub struct TwoFactorUseCase<R>
where
    R: TwoFactorRepository + CredentialRepository + SecurityLogRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> TwoFactorUseCase<R>
where
    R: TwoFactorRepository + CredentialRepository + SecurityLogRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn list(&self, user_id: UserId) -> AuthResult<Vec<TwoFactorDevice>> {
        self.repo.list_devices(user_id).await
    }

    /// Create an unconfirmed TOTP device.
    pub async fn initiate(&self, user: &User) -> AuthResult<EnrollmentOutput> {
        let device = TwoFactorDevice::new_totp(user.user_id);
        let issuer = self.config.totp_issuer.as_str();
        let account = user.email.as_str();

        let otpauth_uri = device.secret.otpauth_url(issuer, account)?;
        let qr_code = device.secret.generate_qr_code(issuer, account)?;
        self.repo.create_device(&device).await?;

        tracing::info!(user_id = %user.user_id, device_id = %device.device_id, "2FA enrollment started");
        Ok(EnrollmentOutput {
            device_id: device.device_id,
            secret: device.secret.as_base32().to_string(),
            otpauth_uri,
            qr_code,
        })
    }

    /// Confirm a pending device with a current code.
    pub async fn confirm(
        &self,
        user_id: UserId,
        device_id: DeviceId,
        code: &str,
        client: &ClientInfo,
    ) -> AuthResult<()> {
        let device = self
            .repo
            .find_device(device_id, user_id)
            .await?
            .filter(|d| !d.confirmed)
            .ok_or(AuthError::DeviceNotFound)?;

        if !device.secret.verify(code).unwrap_or(false) {
            return Err(AuthError::InvalidCode);
        }

        // A concurrent confirm may have won
        if !self.repo.confirm_device(device_id, user_id).await? {
            return Err(AuthError::DeviceNotFound);
        }

        self.repo
            .record_audit(&AuditLog::new(
                AuditAction::TwoFactorEnabled,
                Some(user_id),
                Some(client),
                serde_json::json!({ "device_id": device_id }),
            ))
            .await?;
        tracing::info!(user_id = %user_id, device_id = %device_id, "2FA device confirmed");
        Ok(())
    }

    /// Remove every device and backup code after re-checking the password.
    pub async fn disable(
        &self,
        user_id: UserId,
        password: String,
        client: &ClientInfo,
    ) -> AuthResult<()> {
        let password = ClearTextPassword::for_verification(password);
        let credential = self
            .repo
            .find_credential(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !credential.verify(&password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        self.repo.delete_two_factor(user_id).await?;
        self.repo
            .record_audit(&AuditLog::new(
                AuditAction::TwoFactorDisabled,
                Some(user_id),
                Some(client),
                serde_json::json!({}),
            ))
            .await?;
        tracing::info!(user_id = %user_id, "2FA disabled");
        Ok(())
    }

    /// Replace the user's backup codes and return the plaintext batch once.
    pub async fn regenerate_backup_codes(
        &self,
        user_id: UserId,
        count: Option<usize>,
        client: &ClientInfo,
    ) -> AuthResult<Vec<String>> {
        let count = count.unwrap_or(DEFAULT_BACKUP_CODE_COUNT);
        if !(1..=MAX_BACKUP_CODE_COUNT).contains(&count) {
            return Err(AuthError::validation(
                "count",
                format!("Ensure this value is between 1 and {MAX_BACKUP_CODE_COUNT}."),
            ));
        }

        let key = self.config.backup_code_key();
        let codes = BackupCode::generate_batch(count);
        let records: Vec<BackupCodeRecord> = codes
            .iter()
            .map(|code| BackupCodeRecord::new(user_id, code.hash(&key)))
            .collect();
        self.repo.replace_backup_codes(user_id, &records).await?;

        self.repo
            .record_audit(&AuditLog::new(
                AuditAction::TwoFactorEnabled,
                Some(user_id),
                Some(client),
                serde_json::json!({ "backup_codes": count }),
            ))
            .await?;
        tracing::info!(user_id = %user_id, count, "Backup codes regenerated");

        Ok(codes.into_iter().map(BackupCode::into_inner).collect())
    }
}
