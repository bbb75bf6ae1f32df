//! Backup Code Value Object
//!
//! Single-use recovery codes. Only a keyed one-way hash is ever stored; the
//! plaintext is shown to the user once, right after generation.

use std::fmt;

use rand::RngCore;

/// Codes generated when the caller does not ask for a count
pub const DEFAULT_BACKUP_CODE_COUNT: usize = 10;
pub const MAX_BACKUP_CODE_COUNT: usize = 20;

/// Random bytes per code; 6 bytes encode to 8 base64url characters.
const BACKUP_CODE_BYTES: usize = 6;

/// Plaintext backup code (never persisted).
#[derive(Clone, PartialEq, Eq)]
pub struct BackupCode(String);

impl BackupCode {
    pub fn generate() -> Self {
        let mut bytes = [0u8; BACKUP_CODE_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(platform::crypto::to_base64url(&bytes))
    }

    /// `count` fresh codes.
    pub fn generate_batch(count: usize) -> Vec<Self> {
        (0..count).map(|_| Self::generate()).collect()
    }

    /// Wrap user input; surrounding whitespace is ignored.
    pub fn from_input(input: &str) -> Self {
        Self(input.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Keyed hash used as the stored form (hex HMAC-SHA256).
    pub fn hash(&self, key: &[u8]) -> BackupCodeHash {
        BackupCodeHash(hex::encode(platform::crypto::hmac_sha256(
            key,
            self.0.as_bytes(),
        )))
    }
}

impl fmt::Debug for BackupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BackupCode").field(&"[REDACTED]").finish()
    }
}

/// Stored form of a backup code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackupCodeHash(String);

impl BackupCodeHash {
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_eight_url_safe_chars() {
        let codes = BackupCode::generate_batch(DEFAULT_BACKUP_CODE_COUNT);
        assert_eq!(codes.len(), 10);
        for code in &codes {
            assert_eq!(code.as_str().len(), 8);
            assert!(
                code.as_str()
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            );
        }
    }

    #[test]
    fn test_hash_is_keyed_and_stable() {
        let code = BackupCode::from_input(" abcd-EFG ");
        assert_eq!(code.as_str(), "abcd-EFG");
        assert_eq!(code.hash(b"k1"), code.hash(b"k1"));
        assert_ne!(code.hash(b"k1"), code.hash(b"k2"));
        assert_eq!(code.hash(b"k1").as_str().len(), 64);
    }

    #[test]
    fn test_debug_redaction() {
        let code = BackupCode::from_input("secret12");
        assert!(!format!("{code:?}").contains("secret12"));
    }
}
