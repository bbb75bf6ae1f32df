use serde::{Deserialize, Serialize};
use std::fmt;

/// Role names that grant staff access.
pub const PRIVILEGED_ROLES: &[&str] = &["staff", "admin", "moderator"];

/// Named role held by a user. Users may hold any number of roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Role names are stored trimmed and lowercase.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_privileged(&self) -> bool {
        PRIVILEGED_ROLES.contains(&self.0.as_str())
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_roles() {
        assert!(RoleName::new("admin").is_privileged());
        assert!(RoleName::new(" Moderator ").is_privileged());
        assert!(RoleName::new("staff").is_privileged());
        assert!(!RoleName::new("author").is_privileged());
    }
}
