//! User Entity
//!
//! Account identity and flags. Credentials live in [`Credential`] and
//! presentation data in [`Profile`].
//!
//! [`Credential`]: super::credential::Credential
//! [`Profile`]: super::profile::Profile

use chrono::{DateTime, Utc};
use kernel::Principal;
use kernel::id::UserId;

use crate::domain::value_object::{email::Email, role_name::RoleName, user_name::UserName};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Identity key, unique
    pub email: Email,
    /// Optional handle, unique when set
    pub username: Option<UserName>,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub roles: Vec<RoleName>,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active, unverified user
    pub fn new(email: Email, username: Option<UserName>) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            email,
            username,
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            is_active: true,
            is_staff: false,
            email_verified: false,
            phone_verified: false,
            roles: Vec::new(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn can_login(&self) -> bool {
        self.is_active
    }

    /// Staff flag or any privileged role
    pub fn has_staff_access(&self) -> bool {
        self.is_staff || self.roles.iter().any(RoleName::is_privileged)
    }

    pub fn set_username(&mut self, username: Option<UserName>) {
        self.username = username;
        self.updated_at = Utc::now();
    }

    /// Request context handed to downstream handlers
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            email: self.email.to_string(),
            username: self.username.as_ref().map(|u| u.to_string()),
            is_staff: self.has_staff_access(),
        }
    }
}
