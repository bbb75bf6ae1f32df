//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{AuthSessionId, DeviceId, UserId};
use kernel::pagination::PageRequest;
use platform::password::HashedPassword;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    auth_session::AuthSession,
    credential::Credential,
    profile::Profile,
    security_log::{AuditAction, AuditLog, LoginHistory},
    two_factor::{BackupCodeRecord, TwoFactorDevice},
    user::User,
    verification_token::{EmailVerificationToken, TokenRedemption},
};
use crate::domain::repository::{
    CredentialRepository, ProfileRepository, SecurityLogRepository, SessionRepository,
    TwoFactorRepository, UserRepository, VerificationTokenRepository,
};
use crate::domain::value_object::{
    backup_code::BackupCodeHash, email::Email, role_name::RoleName, totp_secret::TotpSecret,
    user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

/// Column list shared by every user query; roles are folded into an array.
macro_rules! user_select {
    () => {
        r#"
        SELECT
            u.user_id,
            u.email,
            u.username,
            u.first_name,
            u.last_name,
            u.phone_number,
            u.is_active,
            u.is_staff,
            u.email_verified,
            u.phone_verified,
            ARRAY(
                SELECT ur.role_name FROM user_roles ur
                WHERE ur.user_id = u.user_id
                ORDER BY ur.role_name
            ) AS roles,
            u.last_login_at,
            u.created_at,
            u.updated_at
        FROM users u
        "#
    };
}

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create_account(
        &self,
        user: &User,
        credential: &Credential,
        profile: &Profile,
    ) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                username,
                first_name,
                last_name,
                phone_number,
                is_active,
                is_staff,
                email_verified,
                phone_verified,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.username.as_ref().map(UserName::as_str))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone_number)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.email_verified)
        .bind(user.phone_verified)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        for role in &user.roles {
            sqlx::query("INSERT INTO user_roles (user_id, role_name) VALUES ($1, $2)")
                .bind(user.user_id.as_uuid())
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "INSERT INTO credentials (user_id, password_hash, updated_at) VALUES ($1, $2, $3)",
        )
        .bind(credential.user_id.as_uuid())
        .bind(credential.password_hash.as_phc_string())
        .bind(credential.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (
                user_id,
                bio,
                avatar_url,
                location,
                timezone,
                language,
                privacy_settings,
                preferences,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(profile.user_id.as_uuid())
        .bind(&profile.bio)
        .bind(&profile.avatar_url)
        .bind(&profile.location)
        .bind(&profile.timezone)
        .bind(&profile.language)
        .bind(&profile.privacy_settings)
        .bind(&profile.preferences)
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(user_select!(), "WHERE u.user_id = $1"))
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(user_select!(), "WHERE u.email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(user_select!(), "WHERE u.username = $1"))
            .bind(username.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_username(
        &self,
        username: &UserName,
        except: Option<UserId>,
    ) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE username = $1 AND ($2::uuid IS NULL OR user_id <> $2)
            )
            "#,
        )
        .bind(username.as_str())
        .bind(except.map(UserId::into_uuid))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                username = $2,
                first_name = $3,
                last_name = $4,
                phone_number = $5,
                updated_at = $6
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.as_ref().map(UserName::as_str))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone_number)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_last_login(&self, user_id: UserId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2, updated_at = $2 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn mark_email_verified(&self, user_id: UserId) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET email_verified = TRUE, updated_at = NOW()
            WHERE user_id = $1 AND email_verified = FALSE
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn deactivate(&self, user_id: UserId) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET is_active = FALSE, updated_at = NOW()
            WHERE user_id = $1 AND is_active = TRUE
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_active(&self, page: PageRequest) -> AuthResult<(Vec<User>, u64)> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active = TRUE")
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, UserRow>(concat!(
            user_select!(),
            "WHERE u.is_active = TRUE ORDER BY u.created_at, u.user_id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((
            rows.into_iter().map(UserRow::into_user).collect(),
            total.max(0) as u64,
        ))
    }
}

// ============================================================================
// Profile Repository Implementation
// ============================================================================

impl ProfileRepository for PgAuthRepository {
    async fn find_profile(&self, user_id: UserId) -> AuthResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                user_id,
                bio,
                avatar_url,
                location,
                timezone,
                language,
                privacy_settings,
                preferences,
                updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn update_profile(&self, profile: &Profile) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (
                user_id,
                bio,
                avatar_url,
                location,
                timezone,
                language,
                privacy_settings,
                preferences,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                bio = EXCLUDED.bio,
                avatar_url = EXCLUDED.avatar_url,
                location = EXCLUDED.location,
                timezone = EXCLUDED.timezone,
                language = EXCLUDED.language,
                privacy_settings = EXCLUDED.privacy_settings,
                preferences = EXCLUDED.preferences,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.user_id.as_uuid())
        .bind(&profile.bio)
        .bind(&profile.avatar_url)
        .bind(&profile.location)
        .bind(&profile.timezone)
        .bind(&profile.language)
        .bind(&profile.privacy_settings)
        .bind(&profile.preferences)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Credential Repository Implementation
// ============================================================================

impl CredentialRepository for PgAuthRepository {
    async fn find_credential(&self, user_id: UserId) -> AuthResult<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT user_id, password_hash, updated_at FROM credentials WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CredentialRow::into_credential).transpose()
    }

    async fn update_credential(&self, credential: &Credential) -> AuthResult<()> {
        sqlx::query("UPDATE credentials SET password_hash = $2, updated_at = $3 WHERE user_id = $1")
            .bind(credential.user_id.as_uuid())
            .bind(credential.password_hash.as_phc_string())
            .bind(credential.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create_session(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                created_at,
                expires_at,
                last_used_at,
                ip_address,
                user_agent
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.user_id.as_uuid())
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.last_used_at)
        .bind(session.ip_address.as_deref())
        .bind(&session.user_agent)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, session_id: AuthSessionId) -> AuthResult<Option<AuthSession>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                created_at,
                expires_at,
                last_used_at,
                ip_address,
                user_agent
            FROM auth_sessions
            WHERE session_id = $1 AND expires_at > NOW()
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthSessionRow::into_session))
    }

    async fn touch_session(
        &self,
        session_id: AuthSessionId,
        at: DateTime<Utc>,
    ) -> AuthResult<()> {
        sqlx::query("UPDATE auth_sessions SET last_used_at = $2 WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_session(
        &self,
        session_id: AuthSessionId,
        user_id: UserId,
    ) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1 AND user_id = $2")
            .bind(session_id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_sessions_for_user(&self, user_id: UserId) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Two-Factor Repository Implementation
// ============================================================================

impl TwoFactorRepository for PgAuthRepository {
    async fn create_device(&self, device: &TwoFactorDevice) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO two_factor_devices (
                device_id,
                user_id,
                device_type,
                secret,
                confirmed,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(device.device_id.as_uuid())
        .bind(device.user_id.as_uuid())
        .bind(&device.device_type)
        .bind(device.secret.as_base32())
        .bind(device.confirmed)
        .bind(device.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_devices(&self, user_id: UserId) -> AuthResult<Vec<TwoFactorDevice>> {
        let rows = sqlx::query_as::<_, DeviceRow>(
            r#"
            SELECT device_id, user_id, device_type, secret, confirmed, created_at
            FROM two_factor_devices
            WHERE user_id = $1
            ORDER BY created_at, device_id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DeviceRow::into_device).collect()
    }

    async fn find_device(
        &self,
        device_id: DeviceId,
        user_id: UserId,
    ) -> AuthResult<Option<TwoFactorDevice>> {
        let row = sqlx::query_as::<_, DeviceRow>(
            r#"
            SELECT device_id, user_id, device_type, secret, confirmed, created_at
            FROM two_factor_devices
            WHERE device_id = $1 AND user_id = $2
            "#,
        )
        .bind(device_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(DeviceRow::into_device).transpose()
    }

    async fn confirm_device(&self, device_id: DeviceId, user_id: UserId) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE two_factor_devices SET confirmed = TRUE
            WHERE device_id = $1 AND user_id = $2 AND confirmed = FALSE
            "#,
        )
        .bind(device_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_two_factor(&self, user_id: UserId) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM two_factor_devices WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM backup_codes WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn replace_backup_codes(
        &self,
        user_id: UserId,
        codes: &[BackupCodeRecord],
    ) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM backup_codes WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for code in codes {
            sqlx::query(
                r#"
                INSERT INTO backup_codes (id, user_id, code_hash, used, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(code.id)
            .bind(code.user_id.as_uuid())
            .bind(code.code_hash.as_str())
            .bind(code.used)
            .bind(code.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn redeem_backup_code(
        &self,
        user_id: UserId,
        code_hash: &BackupCodeHash,
    ) -> AuthResult<bool> {
        // One row at most; concurrent redeemers skip the locked row
        let redeemed = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE backup_codes SET used = TRUE
            WHERE id = (
                SELECT id FROM backup_codes
                WHERE user_id = $1 AND code_hash = $2 AND used = FALSE
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            AND used = FALSE
            RETURNING id
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code_hash.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(redeemed.is_some())
    }

    async fn count_unused_backup_codes(&self, user_id: UserId) -> AuthResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM backup_codes WHERE user_id = $1 AND used = FALSE",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}

// ============================================================================
// Verification Token Repository Implementation
// ============================================================================

impl VerificationTokenRepository for PgAuthRepository {
    async fn create_verification_token(&self, token: &EmailVerificationToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO email_verification_tokens (token_hash, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&token.token_hash)
        .bind(token.user_id.as_uuid())
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn redeem_verification_token(&self, token_hash: &str) -> AuthResult<TokenRedemption> {
        let redeemed = sqlx::query_scalar::<_, Uuid>(
            r#"
            DELETE FROM email_verification_tokens
            WHERE token_hash = $1 AND expires_at > NOW()
            RETURNING user_id
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(user_id) = redeemed {
            return Ok(TokenRedemption::Redeemed(UserId::from_uuid(user_id)));
        }

        let expired = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM email_verification_tokens WHERE token_hash = $1)",
        )
        .bind(token_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(if expired {
            TokenRedemption::Expired
        } else {
            TokenRedemption::Missing
        })
    }
}

// ============================================================================
// Security Log Repository Implementation
// ============================================================================

impl SecurityLogRepository for PgAuthRepository {
    async fn record_login_attempt(&self, entry: &LoginHistory) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO login_history (
                id,
                user_id,
                timestamp,
                ip_address,
                user_agent,
                successful,
                metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id.map(UserId::into_uuid))
        .bind(entry.timestamp)
        .bind(entry.ip_address.as_deref())
        .bind(&entry.user_agent)
        .bind(entry.successful)
        .bind(&entry.metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_audit(&self, entry: &AuditLog) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id,
                user_id,
                target_user_id,
                action,
                timestamp,
                ip_address,
                details
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id.map(UserId::into_uuid))
        .bind(entry.target_user_id.map(UserId::into_uuid))
        .bind(entry.action.as_str())
        .bind(entry.timestamp)
        .bind(entry.ip_address.as_deref())
        .bind(&entry.details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_audit_logs(&self, page: PageRequest) -> AuthResult<(Vec<AuditLog>, u64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT id, user_id, target_user_id, action, timestamp, ip_address, details
            FROM audit_logs
            ORDER BY timestamp DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let logs = rows
            .into_iter()
            .map(AuditLogRow::into_audit_log)
            .collect::<AuthResult<Vec<_>>>()?;
        Ok((logs, total.max(0) as u64))
    }

    async fn list_login_history(
        &self,
        user_id: Option<UserId>,
        page: PageRequest,
    ) -> AuthResult<(Vec<LoginHistory>, u64)> {
        let user_id = user_id.map(UserId::into_uuid);

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM login_history WHERE ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, LoginHistoryRow>(
            r#"
            SELECT id, user_id, timestamp, ip_address, user_agent, successful, metadata
            FROM login_history
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY timestamp DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((
            rows.into_iter().map(LoginHistoryRow::into_login_history).collect(),
            total.max(0) as u64,
        ))
    }
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    username: Option<String>,
    first_name: String,
    last_name: String,
    phone_number: String,
    is_active: bool,
    is_staff: bool,
    email_verified: bool,
    phone_verified: bool,
    roles: Vec<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            username: self.username.map(UserName::from_db),
            first_name: self.first_name,
            last_name: self.last_name,
            phone_number: self.phone_number,
            is_active: self.is_active,
            is_staff: self.is_staff,
            email_verified: self.email_verified,
            phone_verified: self.phone_verified,
            roles: self.roles.iter().map(RoleName::new).collect(),
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: Uuid,
    bio: String,
    avatar_url: String,
    location: String,
    timezone: String,
    language: String,
    privacy_settings: Value,
    preferences: Value,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> Profile {
        Profile {
            user_id: UserId::from_uuid(self.user_id),
            bio: self.bio,
            avatar_url: self.avatar_url,
            location: self.location,
            timezone: self.timezone,
            language: self.language,
            privacy_settings: self.privacy_settings,
            preferences: self.preferences,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    user_id: Uuid,
    password_hash: String,
    updated_at: DateTime<Utc>,
}

impl CredentialRow {
    fn into_credential(self) -> AuthResult<Credential> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {e}")))?;

        Ok(Credential {
            user_id: UserId::from_uuid(self.user_id),
            password_hash,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    last_used_at: DateTime<Utc>,
    ip_address: Option<String>,
    user_agent: String,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthSession {
        AuthSession {
            session_id: AuthSessionId::from_uuid(self.session_id),
            user_id: UserId::from_uuid(self.user_id),
            created_at: self.created_at,
            expires_at: self.expires_at,
            last_used_at: self.last_used_at,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DeviceRow {
    device_id: Uuid,
    user_id: Uuid,
    device_type: String,
    secret: String,
    confirmed: bool,
    created_at: DateTime<Utc>,
}

impl DeviceRow {
    fn into_device(self) -> AuthResult<TwoFactorDevice> {
        let secret = TotpSecret::from_base32(self.secret)
            .map_err(|e| AuthError::Internal(format!("Invalid TOTP secret: {e}")))?;

        Ok(TwoFactorDevice {
            device_id: DeviceId::from_uuid(self.device_id),
            user_id: UserId::from_uuid(self.user_id),
            device_type: self.device_type,
            secret,
            confirmed: self.confirmed,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LoginHistoryRow {
    id: Uuid,
    user_id: Option<Uuid>,
    timestamp: DateTime<Utc>,
    ip_address: Option<String>,
    user_agent: String,
    successful: bool,
    metadata: Value,
}

impl LoginHistoryRow {
    fn into_login_history(self) -> LoginHistory {
        LoginHistory {
            id: self.id,
            user_id: self.user_id.map(UserId::from_uuid),
            timestamp: self.timestamp,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            successful: self.successful,
            metadata: self.metadata,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: Uuid,
    user_id: Option<Uuid>,
    target_user_id: Option<Uuid>,
    action: String,
    timestamp: DateTime<Utc>,
    ip_address: Option<String>,
    details: Value,
}

impl AuditLogRow {
    fn into_audit_log(self) -> AuthResult<AuditLog> {
        let action = AuditAction::from_code(&self.action)
            .ok_or_else(|| AuthError::Internal(format!("Unknown audit action: {}", self.action)))?;

        Ok(AuditLog {
            id: self.id,
            user_id: self.user_id.map(UserId::from_uuid),
            target_user_id: self.target_user_id.map(UserId::from_uuid),
            action,
            timestamp: self.timestamp,
            ip_address: self.ip_address,
            details: self.details,
        })
    }
}
