//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Every flag flip and single-use consume is one atomic operation in the
//! store; callers never read-then-write.

use chrono::{DateTime, Utc};
use kernel::id::{AuthSessionId, DeviceId, UserId};
use kernel::pagination::PageRequest;

use crate::domain::entity::{
    auth_session::AuthSession,
    credential::Credential,
    profile::Profile,
    security_log::{AuditLog, LoginHistory},
    two_factor::{BackupCodeRecord, TwoFactorDevice},
    user::User,
    verification_token::{EmailVerificationToken, TokenRedemption},
};
use crate::domain::value_object::{
    backup_code::BackupCodeHash, email::Email, user_name::UserName,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert user, credential and profile in one transaction
    async fn create_account(
        &self,
        user: &User,
        credential: &Credential,
        profile: &Profile,
    ) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Whether another account (not `except`) holds this username
    async fn exists_by_username(
        &self,
        username: &UserName,
        except: Option<UserId>,
    ) -> AuthResult<bool>;

    /// Persist editable fields (names, phone, username)
    async fn update(&self, user: &User) -> AuthResult<()>;

    async fn update_last_login(&self, user_id: UserId, at: DateTime<Utc>) -> AuthResult<()>;

    /// Set `email_verified` only when it is still false.
    /// Returns whether this call flipped it.
    async fn mark_email_verified(&self, user_id: UserId) -> AuthResult<bool>;

    /// Set `is_active = false`. Returns whether the user was active.
    async fn deactivate(&self, user_id: UserId) -> AuthResult<bool>;

    /// Active users ordered by join date, with the total count
    async fn list_active(&self, page: PageRequest) -> AuthResult<(Vec<User>, u64)>;
}

/// Profile repository trait
#[trait_variant::make(ProfileRepository: Send)]
pub trait LocalProfileRepository {
    async fn find_profile(&self, user_id: UserId) -> AuthResult<Option<Profile>>;

    async fn update_profile(&self, profile: &Profile) -> AuthResult<()>;
}

/// Credential repository trait
#[trait_variant::make(CredentialRepository: Send)]
pub trait LocalCredentialRepository {
    async fn find_credential(&self, user_id: UserId) -> AuthResult<Option<Credential>>;

    async fn update_credential(&self, credential: &Credential) -> AuthResult<()>;
}

/// Auth session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()>;

    /// Unexpired session by id
    async fn find_session(&self, session_id: AuthSessionId) -> AuthResult<Option<AuthSession>>;

    async fn touch_session(&self, session_id: AuthSessionId, at: DateTime<Utc>)
    -> AuthResult<()>;

    /// Delete the session only when it belongs to `user_id`
    async fn delete_session(&self, session_id: AuthSessionId, user_id: UserId)
    -> AuthResult<bool>;

    /// Revoke every session of a user
    async fn delete_sessions_for_user(&self, user_id: UserId) -> AuthResult<u64>;

    /// Clean up expired sessions
    async fn cleanup_expired_sessions(&self) -> AuthResult<u64>;
}

/// Two-factor device and backup code repository trait
#[trait_variant::make(TwoFactorRepository: Send)]
pub trait LocalTwoFactorRepository {
    async fn create_device(&self, device: &TwoFactorDevice) -> AuthResult<()>;

    /// All devices of a user, oldest first
    async fn list_devices(&self, user_id: UserId) -> AuthResult<Vec<TwoFactorDevice>>;

    async fn find_device(
        &self,
        device_id: DeviceId,
        user_id: UserId,
    ) -> AuthResult<Option<TwoFactorDevice>>;

    /// Flip `confirmed` when the device belongs to `user_id` and is still
    /// unconfirmed. Returns whether this call flipped it.
    async fn confirm_device(&self, device_id: DeviceId, user_id: UserId) -> AuthResult<bool>;

    /// Delete all devices and all backup codes of a user
    async fn delete_two_factor(&self, user_id: UserId) -> AuthResult<()>;

    /// Drop every existing code and store the new batch
    async fn replace_backup_codes(
        &self,
        user_id: UserId,
        codes: &[BackupCodeRecord],
    ) -> AuthResult<()>;

    /// Mark one unused code with this hash as used.
    /// Returns whether a code was redeemed.
    async fn redeem_backup_code(&self, user_id: UserId, code_hash: &BackupCodeHash)
    -> AuthResult<bool>;

    async fn count_unused_backup_codes(&self, user_id: UserId) -> AuthResult<u64>;
}

/// Email verification token repository trait
#[trait_variant::make(VerificationTokenRepository: Send)]
pub trait LocalVerificationTokenRepository {
    async fn create_verification_token(&self, token: &EmailVerificationToken) -> AuthResult<()>;

    /// Delete the token if it is unexpired and report what was found
    async fn redeem_verification_token(&self, token_hash: &str) -> AuthResult<TokenRedemption>;
}

/// Login history and audit log repository trait
#[trait_variant::make(SecurityLogRepository: Send)]
pub trait LocalSecurityLogRepository {
    async fn record_login_attempt(&self, entry: &LoginHistory) -> AuthResult<()>;

    async fn record_audit(&self, entry: &AuditLog) -> AuthResult<()>;

    /// Newest first
    async fn list_audit_logs(&self, page: PageRequest) -> AuthResult<(Vec<AuditLog>, u64)>;

    /// Newest first, optionally for one user
    async fn list_login_history(
        &self,
        user_id: Option<UserId>,
        page: PageRequest,
    ) -> AuthResult<(Vec<LoginHistory>, u64)>;
}

/// Everything the auth use cases need from one store.
pub trait AuthStore:
    UserRepository
    + ProfileRepository
    + CredentialRepository
    + SessionRepository
    + TwoFactorRepository
    + VerificationTokenRepository
    + SecurityLogRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository
        + ProfileRepository
        + CredentialRepository
        + SessionRepository
        + TwoFactorRepository
        + VerificationTokenRepository
        + SecurityLogRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
