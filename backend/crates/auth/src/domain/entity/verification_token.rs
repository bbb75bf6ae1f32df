//! Email Verification Token Entity

use chrono::{DateTime, Duration, Utc};
use kernel::id::UserId;
use platform::crypto::{random_token, sha256_hex};

/// Random bytes in a verification token
const TOKEN_BYTES: usize = 32;

/// Stored form of a verification token; the plaintext goes out by mail only.
#[derive(Debug, Clone)]
pub struct EmailVerificationToken {
    pub user_id: UserId,
    /// SHA-256 hex of the plaintext token
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl EmailVerificationToken {
    /// Mint a token. Returns the record and the plaintext to send.
    pub fn issue(user_id: UserId, ttl: Duration) -> (Self, String) {
        let plaintext = random_token(TOKEN_BYTES);
        let now = Utc::now();
        let record = Self {
            user_id,
            token_hash: Self::hash(&plaintext),
            created_at: now,
            expires_at: now + ttl,
        };
        (record, plaintext)
    }

    pub fn hash(plaintext: &str) -> String {
        sha256_hex(plaintext.trim().as_bytes())
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Result of trying to redeem a verification token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRedemption {
    /// Token was live and is now deleted
    Redeemed(UserId),
    /// Token row exists but is past its expiry
    Expired,
    /// No such token (never issued or already redeemed)
    Missing,
}
