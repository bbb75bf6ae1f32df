//! Credential Entity
//!
//! Password hash kept apart from the user row so that profile queries never
//! load it.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::{ClearTextPassword, HashedPassword};

#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: UserId,
    /// Argon2id PHC string
    pub password_hash: HashedPassword,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(user_id: UserId, password_hash: HashedPassword) -> Self {
        Self {
            user_id,
            password_hash,
            updated_at: Utc::now(),
        }
    }

    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        self.password_hash.verify(password, pepper)
    }

    pub fn update_password(&mut self, password_hash: HashedPassword) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }
}
