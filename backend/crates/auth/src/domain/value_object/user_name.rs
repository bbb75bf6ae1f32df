//! User Name Value Object
//!
//! Optional public handle of an account. Login accepts it in place of the
//! email address when the identifier contains no `@`.
//!
//! ## Invariants
//! - NFKC normalized and trimmed
//! - 1..=150 characters
//! - Only letters, digits and `_ . @ + -`

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 150;

/// Allowed special characters besides word characters
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '@', '+', '-'];

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// User name is empty after normalization
    Empty,

    /// User name is too long (maximum: USER_NAME_MAX_LENGTH)
    TooLong { length: usize, max: usize },

    /// User name contains invalid character
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "This field may not be blank."),
            Self::TooLong { max, .. } => {
                write!(f, "Ensure this field has no more than {max} characters.")
            }
            Self::InvalidCharacter { .. } => write!(
                f,
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
            ),
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated, normalized user name
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Normalize (NFKC, trim) and validate raw input.
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let normalized: String = input.as_ref().nfkc().collect::<String>().trim().to_string();
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    fn validate(value: &str) -> Result<(), UserNameError> {
        if value.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = value.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some((position, char)) = value
            .chars()
            .enumerate()
            .find(|(_, c)| !(c.is_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(c)))
        {
            return Err(UserNameError::InvalidCharacter { char, position });
        }

        Ok(())
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.0).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_names() {
        assert_eq!(UserName::new("ada").unwrap().as_str(), "ada");
        assert!(UserName::new("ada.lovelace+blog@home").is_ok());
        assert!(UserName::new("Ünïcödé_42").is_ok());
        assert_eq!(UserName::new("  ada  ").unwrap().as_str(), "ada");
    }

    #[test]
    fn test_fullwidth_input_is_normalized() {
        assert_eq!(UserName::new("ａｄａ").unwrap().as_str(), "ada");
    }

    #[test]
    fn test_invalid_user_names() {
        assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
        assert!(matches!(
            UserName::new("a".repeat(151)),
            Err(UserNameError::TooLong { .. })
        ));
        assert!(matches!(
            UserName::new("ada lovelace"),
            Err(UserNameError::InvalidCharacter { char: ' ', position: 3 })
        ));
        assert!(UserName::new("ada/lovelace").is_err());
    }
}
