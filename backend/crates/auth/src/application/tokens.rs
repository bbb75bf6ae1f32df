//! Token issuing and verification
//!
//! - Access token: HS256 JWT, short-lived, carries the session id (`sid`).
//! - Refresh token: `<session_uuid>.<b64url HMAC-SHA256(session_uuid)>`.
//! - Password reset token: `<ts_b36>-<hex HMAC>` over the user id, password
//!   hash, last login and timestamp. Stateless; any password change or login
//!   invalidates it.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::{AuthSessionId, UserId};
use platform::crypto::{constant_time_eq, from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::{credential::Credential, user::User};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id
    pub sub: String,
    /// Session id
    pub sid: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl AccessClaims {
    pub fn user_id(&self) -> AuthResult<UserId> {
        self.sub.parse().map_err(|_| AuthError::InvalidSession)
    }

    pub fn session_id(&self) -> AuthResult<AuthSessionId> {
        self.sid.parse().map_err(|_| AuthError::InvalidSession)
    }
}

pub fn issue_access_token(
    config: &AuthConfig,
    user: &User,
    session_id: AuthSessionId,
) -> AuthResult<String> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: user.user_id.to_string(),
        sid: session_id.to_string(),
        email: user.email.to_string(),
        exp: (now + config.access_token_ttl_chrono()).timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&config.jwt_secret),
    )
    .map_err(|e| AuthError::Internal(format!("Failed to sign access token: {e}")))
}

/// Verify signature and expiry.
pub fn decode_access_token(config: &AuthConfig, token: &str) -> AuthResult<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(&config.jwt_secret),
        &validation,
    )?;
    Ok(data.claims)
}

pub fn sign_refresh_token(config: &AuthConfig, session_id: AuthSessionId) -> String {
    let id = session_id.to_string();
    let signature = hmac_sha256(&config.refresh_key(), id.as_bytes());
    format!("{}.{}", id, to_base64url(&signature))
}

/// Session id behind a well-formed, correctly signed refresh token.
pub fn parse_refresh_token(config: &AuthConfig, token: &str) -> Option<AuthSessionId> {
    let (id, signature) = token.trim().split_once('.')?;
    let signature = from_base64url(signature).ok()?;
    if !verify_hmac_sha256(&config.refresh_key(), id.as_bytes(), &signature) {
        return None;
    }
    id.parse().ok()
}

pub fn make_password_reset_token(
    config: &AuthConfig,
    user: &User,
    credential: &Credential,
    now: DateTime<Utc>,
) -> String {
    let ts = now.timestamp().max(0) as u64;
    let ts_b36 = to_base36(ts);
    let signature = reset_signature(config, user, credential, &ts_b36);
    format!("{ts_b36}-{signature}")
}

pub fn check_password_reset_token(
    config: &AuthConfig,
    user: &User,
    credential: &Credential,
    token: &str,
    now: DateTime<Utc>,
) -> bool {
    let Some((ts_b36, signature)) = token.trim().split_once('-') else {
        return false;
    };
    let Some(ts) = from_base36(ts_b36) else {
        return false;
    };

    let expected = reset_signature(config, user, credential, ts_b36);
    if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
        return false;
    }

    let age = now.timestamp().saturating_sub(ts as i64);
    age >= 0 && (age as u64) <= config.password_reset_ttl.as_secs()
}

fn reset_signature(config: &AuthConfig, user: &User, credential: &Credential, ts_b36: &str) -> String {
    let last_login = user
        .last_login_at
        .map(|t| t.timestamp_micros().to_string())
        .unwrap_or_default();
    let payload = format!(
        "{}|{}|{}|{}",
        user.user_id,
        credential.password_hash.as_phc_string(),
        last_login,
        ts_b36
    );
    hex::encode(hmac_sha256(&config.password_reset_key(), payload.as_bytes()))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn from_base36(s: &str) -> Option<u64> {
    if s.is_empty() || s.len() > 13 {
        return None;
    }
    u64::from_str_radix(s, 36).ok()
}
