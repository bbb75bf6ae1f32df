//! Profile Entity
//!
//! Presentation and preference data, created together with the user.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde_json::Value;

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: UserId,
    pub bio: String,
    pub avatar_url: String,
    pub location: String,
    pub timezone: String,
    pub language: String,
    /// Free-form JSON object
    pub privacy_settings: Value,
    /// Free-form JSON object
    pub preferences: Value,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            bio: String::new(),
            avatar_url: String::new(),
            location: String::new(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            privacy_settings: Value::Object(Default::default()),
            preferences: Value::Object(Default::default()),
            updated_at: Utc::now(),
        }
    }
}
