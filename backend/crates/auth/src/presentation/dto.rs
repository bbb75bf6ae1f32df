//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{DeviceId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ProfileUpdate;
use crate::domain::entity::{profile::Profile, two_factor::TwoFactorDevice, user::User};

// ============================================================================
// Users
// ============================================================================

/// Public user representation
#[derive(Debug, Clone, Serialize)]
pub struct UserPublicResponse {
    pub id: UserId,
    pub email: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email_verified: bool,
    pub roles: Vec<String>,
}

impl From<&User> for UserPublicResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            email: user.email.to_string(),
            username: user.username.as_ref().map(|u| u.to_string()),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email_verified: user.email_verified,
            roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
        }
    }
}

impl From<User> for UserPublicResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileBody {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub privacy_settings: Option<Value>,
    pub preferences: Option<Value>,
}

impl From<&Profile> for ProfileBody {
    fn from(profile: &Profile) -> Self {
        Self {
            bio: Some(profile.bio.clone()),
            avatar_url: Some(profile.avatar_url.clone()),
            location: Some(profile.location.clone()),
            timezone: Some(profile.timezone.clone()),
            language: Some(profile.language.clone()),
            privacy_settings: Some(profile.privacy_settings.clone()),
            preferences: Some(profile.preferences.clone()),
        }
    }
}

/// Own account, with profile
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub id: UserId,
    pub email: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email_verified: bool,
    pub phone_number: String,
    pub is_staff: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
    pub profile: ProfileBody,
}

impl MeResponse {
    pub fn new(user: &User, profile: &Profile) -> Self {
        Self {
            id: user.user_id,
            email: user.email.to_string(),
            username: user.username.as_ref().map(|u| u.to_string()),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email_verified: user.email_verified,
            phone_number: user.phone_number.clone(),
            is_staff: user.has_staff_access(),
            last_login: user.last_login_at,
            date_joined: user.created_at,
            profile: ProfileBody::from(profile),
        }
    }
}

/// PUT/PATCH /users/me
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MeUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub username: Option<String>,
    #[serde(default)]
    pub profile: Option<ProfileBody>,
}

impl From<MeUpdateRequest> for ProfileUpdate {
    fn from(req: MeUpdateRequest) -> Self {
        let profile = req.profile.unwrap_or_default();
        ProfileUpdate {
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            username: req.username,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
            location: profile.location,
            timezone: profile.timezone,
            language: profile.language,
            privacy_settings: profile.privacy_settings,
            preferences: profile.preferences,
        }
    }
}

// ============================================================================
// Register / Login / Tokens
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: Option<String>,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Email, or username when it contains no `@`
    pub email_or_username: String,
    pub password: String,
    #[serde(default)]
    pub totp_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserPublicResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogoutRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailVerifyRequest {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub uid: String,
    pub token: String,
    pub new_password: String,
}

/// `{"detail": "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct DetailResponse {
    pub detail: &'static str,
}

impl DetailResponse {
    pub const fn new(detail: &'static str) -> Self {
        Self { detail }
    }
}

// ============================================================================
// Two-Factor
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DeviceResponse {
    pub id: DeviceId,
    pub device_type: String,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<TwoFactorDevice> for DeviceResponse {
    fn from(device: TwoFactorDevice) -> Self {
        Self {
            id: device.device_id,
            device_type: device.device_type,
            confirmed: device.confirmed,
            created_at: device.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentResponse {
    pub otpauth_uri: String,
    pub secret: String,
    pub device_id: DeviceId,
    /// Base64 PNG of `otpauth_uri`
    pub qr_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmDeviceRequest {
    pub device_id: DeviceId,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisableTwoFactorRequest {
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackupCodesRequest {
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupCodesResponse {
    pub codes: Vec<String>,
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct LoginHistoryQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub user_id: Option<UserId>,
}
