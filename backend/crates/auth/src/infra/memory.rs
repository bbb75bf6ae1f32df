//! In-memory repository
//!
//! Backs tests and local runs without a database. One `RwLock` guards the
//! whole state so every conditional update is atomic.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{AuthSessionId, DeviceId, UserId};
use kernel::pagination::PageRequest;
use tokio::sync::RwLock;

use crate::domain::entity::{
    auth_session::AuthSession,
    credential::Credential,
    profile::Profile,
    security_log::{AuditLog, LoginHistory},
    two_factor::{BackupCodeRecord, TwoFactorDevice},
    user::User,
    verification_token::{EmailVerificationToken, TokenRedemption},
};
use crate::domain::repository::{
    CredentialRepository, ProfileRepository, SecurityLogRepository, SessionRepository,
    TwoFactorRepository, UserRepository, VerificationTokenRepository,
};
use crate::domain::value_object::{backup_code::BackupCodeHash, email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    credentials: HashMap<UserId, Credential>,
    profiles: HashMap<UserId, Profile>,
    sessions: HashMap<AuthSessionId, AuthSession>,
    devices: Vec<TwoFactorDevice>,
    backup_codes: Vec<BackupCodeRecord>,
    verification_tokens: HashMap<String, EmailVerificationToken>,
    login_history: Vec<LoginHistory>,
    audit_logs: Vec<AuditLog>,
}

#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant staff access directly (there is no HTTP surface for it).
    pub async fn set_staff(&self, user_id: UserId, is_staff: bool) {
        if let Some(user) = self.state.write().await.users.get_mut(&user_id) {
            user.is_staff = is_staff;
        }
    }

    pub async fn login_history_len(&self) -> usize {
        self.state.read().await.login_history.len()
    }

    pub async fn audit_actions(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .audit_logs
            .iter()
            .map(|log| log.action.to_string())
            .collect()
    }

    /// Move a verification token's expiry into the past.
    pub async fn expire_verification_tokens(&self) {
        let past = Utc::now() - chrono::Duration::seconds(1);
        for token in self.state.write().await.verification_tokens.values_mut() {
            token.expires_at = past;
        }
    }
}

fn page_slice<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

impl UserRepository for InMemoryAuthRepository {
    async fn create_account(
        &self,
        user: &User,
        credential: &Credential,
        profile: &Profile,
    ) -> AuthResult<()> {
        let mut state = self.state.write().await;
        let clash = state.users.values().any(|u| {
            u.email == user.email || (u.username.is_some() && u.username == user.username)
        });
        if clash {
            return Err(AuthError::validation(
                "email",
                "A user with this email already exists.",
            ));
        }
        state.users.insert(user.user_id, user.clone());
        state.credentials.insert(user.user_id, credential.clone());
        state.profiles.insert(user.user_id, profile.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username.as_ref() == Some(username))
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn exists_by_username(
        &self,
        username: &UserName,
        except: Option<UserId>,
    ) -> AuthResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.values().any(|u| {
            u.username.as_ref() == Some(username) && Some(u.user_id) != except
        }))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if let Some(stored) = state.users.get_mut(&user.user_id) {
            stored.username = user.username.clone();
            stored.first_name = user.first_name.clone();
            stored.last_name = user.last_name.clone();
            stored.phone_number = user.phone_number.clone();
            stored.updated_at = user.updated_at;
        }
        Ok(())
    }

    async fn update_last_login(&self, user_id: UserId, at: DateTime<Utc>) -> AuthResult<()> {
        if let Some(user) = self.state.write().await.users.get_mut(&user_id) {
            user.last_login_at = Some(at);
            user.updated_at = at;
        }
        Ok(())
    }

    async fn mark_email_verified(&self, user_id: UserId) -> AuthResult<bool> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&user_id) {
            Some(user) if !user.email_verified => {
                user.email_verified = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn deactivate(&self, user_id: UserId) -> AuthResult<bool> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&user_id) {
            Some(user) if user.is_active => {
                user.is_active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_active(&self, page: PageRequest) -> AuthResult<(Vec<User>, u64)> {
        let state = self.state.read().await;
        let mut active: Vec<User> = state.users.values().filter(|u| u.is_active).cloned().collect();
        active.sort_by_key(|u| (u.created_at, *u.user_id.as_uuid()));
        Ok((page_slice(&active, page), active.len() as u64))
    }
}

impl ProfileRepository for InMemoryAuthRepository {
    async fn find_profile(&self, user_id: UserId) -> AuthResult<Option<Profile>> {
        Ok(self.state.read().await.profiles.get(&user_id).cloned())
    }

    async fn update_profile(&self, profile: &Profile) -> AuthResult<()> {
        self.state
            .write()
            .await
            .profiles
            .insert(profile.user_id, profile.clone());
        Ok(())
    }
}

impl CredentialRepository for InMemoryAuthRepository {
    async fn find_credential(&self, user_id: UserId) -> AuthResult<Option<Credential>> {
        Ok(self.state.read().await.credentials.get(&user_id).cloned())
    }

    async fn update_credential(&self, credential: &Credential) -> AuthResult<()> {
        self.state
            .write()
            .await
            .credentials
            .insert(credential.user_id, credential.clone());
        Ok(())
    }
}

impl SessionRepository for InMemoryAuthRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()> {
        self.state
            .write()
            .await
            .sessions
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: AuthSessionId) -> AuthResult<Option<AuthSession>> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .get(&session_id)
            .filter(|s| !s.is_expired())
            .cloned())
    }

    async fn touch_session(
        &self,
        session_id: AuthSessionId,
        at: DateTime<Utc>,
    ) -> AuthResult<()> {
        if let Some(session) = self.state.write().await.sessions.get_mut(&session_id) {
            session.last_used_at = at;
        }
        Ok(())
    }

    async fn delete_session(
        &self,
        session_id: AuthSessionId,
        user_id: UserId,
    ) -> AuthResult<bool> {
        let mut state = self.state.write().await;
        if state
            .sessions
            .get(&session_id)
            .is_some_and(|s| s.user_id == user_id)
        {
            state.sessions.remove(&session_id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete_sessions_for_user(&self, user_id: UserId) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired());
        Ok((before - state.sessions.len()) as u64)
    }
}

impl TwoFactorRepository for InMemoryAuthRepository {
    async fn create_device(&self, device: &TwoFactorDevice) -> AuthResult<()> {
        self.state.write().await.devices.push(device.clone());
        Ok(())
    }

    async fn list_devices(&self, user_id: UserId) -> AuthResult<Vec<TwoFactorDevice>> {
        let state = self.state.read().await;
        Ok(state
            .devices
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_device(
        &self,
        device_id: DeviceId,
        user_id: UserId,
    ) -> AuthResult<Option<TwoFactorDevice>> {
        let state = self.state.read().await;
        Ok(state
            .devices
            .iter()
            .find(|d| d.device_id == device_id && d.user_id == user_id)
            .cloned())
    }

    async fn confirm_device(&self, device_id: DeviceId, user_id: UserId) -> AuthResult<bool> {
        let mut state = self.state.write().await;
        match state
            .devices
            .iter_mut()
            .find(|d| d.device_id == device_id && d.user_id == user_id && !d.confirmed)
        {
            Some(device) => {
                device.confirmed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_two_factor(&self, user_id: UserId) -> AuthResult<()> {
        let mut state = self.state.write().await;
        state.devices.retain(|d| d.user_id != user_id);
        state.backup_codes.retain(|c| c.user_id != user_id);
        Ok(())
    }

    async fn replace_backup_codes(
        &self,
        user_id: UserId,
        codes: &[BackupCodeRecord],
    ) -> AuthResult<()> {
        let mut state = self.state.write().await;
        state.backup_codes.retain(|c| c.user_id != user_id);
        state.backup_codes.extend_from_slice(codes);
        Ok(())
    }

    async fn redeem_backup_code(
        &self,
        user_id: UserId,
        code_hash: &BackupCodeHash,
    ) -> AuthResult<bool> {
        let mut state = self.state.write().await;
        match state
            .backup_codes
            .iter_mut()
            .find(|c| c.user_id == user_id && !c.used && &c.code_hash == code_hash)
        {
            Some(code) => {
                code.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_unused_backup_codes(&self, user_id: UserId) -> AuthResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .backup_codes
            .iter()
            .filter(|c| c.user_id == user_id && !c.used)
            .count() as u64)
    }
}

impl VerificationTokenRepository for InMemoryAuthRepository {
    async fn create_verification_token(&self, token: &EmailVerificationToken) -> AuthResult<()> {
        self.state
            .write()
            .await
            .verification_tokens
            .insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn redeem_verification_token(&self, token_hash: &str) -> AuthResult<TokenRedemption> {
        let mut state = self.state.write().await;
        match state.verification_tokens.get(token_hash) {
            None => Ok(TokenRedemption::Missing),
            Some(token) if token.is_expired() => Ok(TokenRedemption::Expired),
            Some(token) => {
                let user_id = token.user_id;
                state.verification_tokens.remove(token_hash);
                Ok(TokenRedemption::Redeemed(user_id))
            }
        }
    }
}

impl SecurityLogRepository for InMemoryAuthRepository {
    async fn record_login_attempt(&self, entry: &LoginHistory) -> AuthResult<()> {
        self.state.write().await.login_history.push(entry.clone());
        Ok(())
    }

    async fn record_audit(&self, entry: &AuditLog) -> AuthResult<()> {
        self.state.write().await.audit_logs.push(entry.clone());
        Ok(())
    }

    async fn list_audit_logs(&self, page: PageRequest) -> AuthResult<(Vec<AuditLog>, u64)> {
        let state = self.state.read().await;
        let newest_first: Vec<AuditLog> = state.audit_logs.iter().rev().cloned().collect();
        Ok((page_slice(&newest_first, page), newest_first.len() as u64))
    }

    async fn list_login_history(
        &self,
        user_id: Option<UserId>,
        page: PageRequest,
    ) -> AuthResult<(Vec<LoginHistory>, u64)> {
        let state = self.state.read().await;
        let newest_first: Vec<LoginHistory> = state
            .login_history
            .iter()
            .rev()
            .filter(|h| user_id.is_none() || h.user_id == user_id)
            .cloned()
            .collect();
        Ok((page_slice(&newest_first, page), newest_first.len() as u64))
    }
}
