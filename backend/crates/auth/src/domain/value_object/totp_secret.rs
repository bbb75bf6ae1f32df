//! TOTP Secret Value Object
//!
//! Wraps a TOTP secret for two-factor authentication.
//! Uses Google Authenticator compatible settings.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use totp_rs::{Algorithm, Secret, TOTP};

/// TOTP configuration constants
const TOTP_DIGITS: usize = 6;
const TOTP_STEP: u64 = 30;
/// Accept one step before and after the current one
const TOTP_SKEW: u8 = 1;

/// TOTP Secret for two-factor authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpSecret {
    /// Base32-encoded secret
    secret_base32: String,
}

impl TotpSecret {
    /// Generate a new random TOTP secret
    pub fn generate() -> Self {
        let secret = Secret::generate_secret();
        Self {
            secret_base32: secret.to_encoded().to_string(),
        }
    }

    /// Create from a base32-encoded string (from database)
    pub fn from_base32(secret: impl Into<String>) -> AppResult<Self> {
        let secret_str = secret.into();
        // Validate by trying to decode
        Secret::Encoded(secret_str.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {}", e)))?;

        Ok(Self {
            secret_base32: secret_str,
        })
    }

    /// Get the base32-encoded secret for storage
    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    fn to_totp(&self, issuer: Option<&str>, account_name: &str) -> AppResult<TOTP> {
        let secret = Secret::Encoded(self.secret_base32.clone());

        TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            secret
                .to_bytes()
                .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {}", e)))?,
            issuer.map(str::to_string),
            account_name.to_string(),
        )
        .map_err(|e| AppError::internal(format!("Failed to create TOTP: {}", e)))
    }

    /// Verify a code against the current window (±1 step).
    ///
    /// Whitespace inside the code is ignored; anything that is not six digits
    /// is rejected without touching the clock.
    pub fn verify(&self, code: &str) -> AppResult<bool> {
        let code: String = code.chars().filter(|c| !c.is_whitespace()).collect();
        if code.len() != TOTP_DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
            return Ok(false);
        }
        let totp = self.to_totp(None, "")?;
        Ok(totp.check_current(&code).unwrap_or(false))
    }

    /// Generate current TOTP code (for testing)
    #[cfg(test)]
    pub fn generate_current(&self) -> AppResult<String> {
        let totp = self.to_totp(None, "")?;
        totp.generate_current()
            .map_err(|e| AppError::internal(format!("Failed to generate TOTP: {}", e)))
    }

    /// Generate QR code as base64-encoded PNG
    pub fn generate_qr_code(&self, issuer: &str, account_name: &str) -> AppResult<String> {
        let totp = self.to_totp(Some(issuer), account_name)?;
        totp.get_qr_base64()
            .map_err(|e| AppError::internal(format!("Failed to generate QR code: {}", e)))
    }

    /// `otpauth://totp/...` provisioning URI
    pub fn otpauth_url(&self, issuer: &str, account_name: &str) -> AppResult<String> {
        let totp = self.to_totp(Some(issuer), account_name)?;
        Ok(totp.get_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totp_secret_verify() {
        let secret = TotpSecret::generate();

        let code = secret.generate_current().unwrap();
        assert!(secret.verify(&code).unwrap());

        let spaced = format!("{} {}", &code[..3], &code[3..]);
        assert!(secret.verify(&spaced).unwrap());

        assert!(!secret.verify("").unwrap());
        assert!(!secret.verify("12ab56").unwrap());
    }

    #[test]
    fn test_totp_secret_from_base32() {
        let secret = TotpSecret::generate();
        let base32 = secret.as_base32().to_string();

        let restored = TotpSecret::from_base32(base32).unwrap();
        assert_eq!(secret.as_base32(), restored.as_base32());
        assert!(TotpSecret::from_base32("not base32!").is_err());
    }

    #[test]
    fn test_otpauth_url_names_issuer_and_account() {
        let secret = TotpSecret::generate();
        let url = secret.otpauth_url("Quill", "ada@example.com").unwrap();
        assert!(url.starts_with("otpauth://totp/"));
        assert!(url.contains("issuer=Quill"));
        assert!(url.contains(secret.as_base32()));
    }

    #[test]
    fn test_totp_qr_code() {
        let secret = TotpSecret::generate();
        let qr = secret.generate_qr_code("Quill", "ada@example.com").unwrap();
        assert!(!qr.is_empty());
    }
}
