//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::crypto::hmac_sha256;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 key for access tokens (32 bytes)
    pub jwt_secret: [u8; 32],
    /// Root key for refresh-token signatures, reset tokens and backup-code
    /// hashes. Each use derives its own subkey.
    pub token_secret: [u8; 32],
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token / session lifetime (7 days)
    pub refresh_token_ttl: Duration,
    /// Email verification token lifetime (60 minutes)
    pub verification_token_ttl: Duration,
    /// Password reset token lifetime (3 days)
    pub password_reset_ttl: Duration,
    /// Issuer shown in authenticator apps
    pub totp_issuer: String,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Reject passwords found in the HIBP corpus on registration and reset
    pub check_breached_passwords: bool,
    /// Base URL used in emailed links
    pub frontend_url: String,
    /// Days between a deletion request and deactivation notice
    pub deletion_grace_days: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: [0u8; 32],
            token_secret: [0u8; 32],
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600),
            verification_token_ttl: Duration::from_secs(60 * 60),
            password_reset_ttl: Duration::from_secs(3 * 24 * 3600),
            totp_issuer: "Quill".to_string(),
            password_pepper: None,
            check_breached_passwords: false,
            frontend_url: "http://localhost:40922".to_string(),
            deletion_grace_days: 30,
        }
    }
}

impl AuthConfig {
    /// Create config with random secrets (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut jwt_secret = [0u8; 32];
        let mut token_secret = [0u8; 32];
        rand::rng().fill_bytes(&mut jwt_secret);
        rand::rng().fill_bytes(&mut token_secret);
        Self {
            jwt_secret,
            token_secret,
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn refresh_key(&self) -> [u8; 32] {
        hmac_sha256(&self.token_secret, b"refresh-token")
    }

    pub fn password_reset_key(&self) -> [u8; 32] {
        hmac_sha256(&self.token_secret, b"password-reset")
    }

    pub fn backup_code_key(&self) -> [u8; 32] {
        hmac_sha256(&self.token_secret, b"backup-code")
    }

    pub fn access_token_ttl_chrono(&self) -> chrono::Duration {
        to_chrono(self.access_token_ttl)
    }

    pub fn refresh_token_ttl_chrono(&self) -> chrono::Duration {
        to_chrono(self.refresh_token_ttl)
    }

    pub fn verification_token_ttl_chrono(&self) -> chrono::Duration {
        to_chrono(self.verification_token_ttl)
    }
}

fn to_chrono(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subkeys_differ() {
        let config = AuthConfig::with_random_secret();
        assert_ne!(config.refresh_key(), config.password_reset_key());
        assert_ne!(config.refresh_key(), config.backup_code_key());
        assert_ne!(config.jwt_secret, config.token_secret);
    }

    #[test]
    fn test_default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_ttl_chrono(), chrono::Duration::minutes(15));
        assert_eq!(config.refresh_token_ttl_chrono(), chrono::Duration::days(7));
        assert_eq!(config.verification_token_ttl_chrono(), chrono::Duration::minutes(60));
    }
}
