//! Environment-driven configuration helpers
//!
//! `.env` is loaded by the binary (dotenvy); these helpers only read the
//! process environment and report precise errors.

use std::str::FromStr;

use thiserror::Error;

use crate::crypto::{from_base64, random_key};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(String),

    #[error("Environment variable {key} has an invalid value: {reason}")]
    Invalid { key: String, reason: String },
}

pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env_opt(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

pub fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

pub fn env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match env_opt(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: format!("expected a boolean, got {v:?}"),
        }),
    }
}

/// Comma-separated list, blanks removed.
pub fn env_list(key: &str) -> Vec<String> {
    env_opt(key)
        .map(|raw| parse_list(&raw))
        .unwrap_or_default()
}

pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 32-byte secret given as standard base64.
///
/// When the variable is unset, `allow_random` decides between a random key
/// (development) and an error (release).
pub fn env_secret(key: &str, allow_random: bool) -> Result<[u8; 32], ConfigError> {
    match env_opt(key) {
        Some(raw) => decode_secret(key, &raw),
        None if allow_random => {
            tracing::warn!(key, "Secret not set, using a random value for this process");
            Ok(random_key())
        }
        None => Err(ConfigError::Missing(key.to_string())),
    }
}

pub fn decode_secret(key: &str, raw: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = from_base64(raw.trim()).map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    bytes.try_into().map_err(|b: Vec<u8>| ConfigError::Invalid {
        key: key.to_string(),
        reason: format!("expected 32 bytes, got {}", b.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::to_base64;

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" http://a.test, ,http://b.test "),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_decode_secret() {
        let key = [7u8; 32];
        assert_eq!(decode_secret("K", &to_base64(&key)).unwrap(), key);
        assert!(matches!(
            decode_secret("K", &to_base64(&[1u8; 16])),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(decode_secret("K", "***").is_err());
    }

    #[test]
    fn test_missing_values_use_defaults() {
        let key = "PLATFORM_CONFIG_TEST_SURELY_UNSET";
        assert_eq!(env_or(key, "fallback"), "fallback");
        assert_eq!(env_parse::<u32>(key, 5).unwrap(), 5);
        assert!(env_bool(key, true).unwrap());
        assert!(env_list(key).is_empty());
        assert_eq!(env_required(key), Err(ConfigError::Missing(key.to_string())));
        assert!(env_secret(key, false).is_err());
        assert!(env_secret(key, true).is_ok());
    }
}
