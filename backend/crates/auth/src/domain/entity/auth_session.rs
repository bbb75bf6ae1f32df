//! Auth Session Entity
//!
//! Server-side record behind a refresh token. Access tokens carry its id
//! (`sid`) so that revoking the row also invalidates them.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{AuthSessionId, UserId};
use platform::client::ClientInfo;

/// Auth session entity
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: AuthSessionId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl AuthSession {
    /// Create a new auth session
    ///
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn new(user_id: UserId, client: &ClientInfo, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            session_id: AuthSessionId::new(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
            last_used_at: now,
            ip_address: client.ip_string(),
            user_agent: client.user_agent.clone(),
        }
    }

    /// Check if session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_used_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let client = ClientInfo::new(None, "test-agent");
        let live = AuthSession::new(UserId::new(), &client, Duration::days(7));
        assert!(!live.is_expired());
        assert_eq!(live.user_agent, "test-agent");

        let dead = AuthSession::new(UserId::new(), &client, Duration::seconds(-1));
        assert!(dead.is_expired());
    }
}
