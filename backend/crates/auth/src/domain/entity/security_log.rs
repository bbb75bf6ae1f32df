//! Security Log Entities
//!
//! Append-only login history and audit trail.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::client::ClientInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One row per login attempt, successful or not.
#[derive(Debug, Clone, Serialize)]
pub struct LoginHistory {
    pub id: Uuid,
    /// `None` when the identifier matched no account
    pub user_id: Option<UserId>,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub successful: bool,
    pub metadata: Value,
}

impl LoginHistory {
    pub fn success(user_id: UserId, client: &ClientInfo) -> Self {
        Self::new(Some(user_id), client, true, Value::Object(Default::default()))
    }

    pub fn failure(user_id: Option<UserId>, client: &ClientInfo, reason: &str) -> Self {
        Self::new(user_id, client, false, serde_json::json!({ "reason": reason }))
    }

    fn new(user_id: Option<UserId>, client: &ClientInfo, successful: bool, metadata: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            timestamp: Utc::now(),
            ip_address: client.ip_string(),
            user_agent: client.user_agent.clone(),
            successful,
            metadata,
        }
    }
}

/// Security-relevant account actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "password_change")]
    PasswordChange,
    #[serde(rename = "password_reset")]
    PasswordReset,
    #[serde(rename = "email_change")]
    EmailChange,
    #[serde(rename = "email_verify")]
    EmailVerify,
    #[serde(rename = "role_assigned")]
    RoleAssigned,
    #[serde(rename = "role_revoked")]
    RoleRevoked,
    #[serde(rename = "2fa_enabled")]
    TwoFactorEnabled,
    #[serde(rename = "2fa_disabled")]
    TwoFactorDisabled,
    #[serde(rename = "login_failed")]
    LoginFailed,
    #[serde(rename = "login_success")]
    LoginSuccess,
    #[serde(rename = "export_requested")]
    ExportRequested,
    #[serde(rename = "delete_requested")]
    DeleteRequested,
}

impl AuditAction {
    pub const ALL: [AuditAction; 12] = [
        AuditAction::PasswordChange,
        AuditAction::PasswordReset,
        AuditAction::EmailChange,
        AuditAction::EmailVerify,
        AuditAction::RoleAssigned,
        AuditAction::RoleRevoked,
        AuditAction::TwoFactorEnabled,
        AuditAction::TwoFactorDisabled,
        AuditAction::LoginFailed,
        AuditAction::LoginSuccess,
        AuditAction::ExportRequested,
        AuditAction::DeleteRequested,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::PasswordChange => "password_change",
            AuditAction::PasswordReset => "password_reset",
            AuditAction::EmailChange => "email_change",
            AuditAction::EmailVerify => "email_verify",
            AuditAction::RoleAssigned => "role_assigned",
            AuditAction::RoleRevoked => "role_revoked",
            AuditAction::TwoFactorEnabled => "2fa_enabled",
            AuditAction::TwoFactorDisabled => "2fa_disabled",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::LoginSuccess => "login_success",
            AuditAction::ExportRequested => "export_requested",
            AuditAction::DeleteRequested => "delete_requested",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == code)
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditLog {
    pub id: Uuid,
    /// Acting user
    pub user_id: Option<UserId>,
    pub target_user_id: Option<UserId>,
    pub action: AuditAction,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub details: Value,
}

impl AuditLog {
    /// Entry where the actor acts on their own account
    pub fn new(
        action: AuditAction,
        user_id: Option<UserId>,
        client: Option<&ClientInfo>,
        details: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            target_user_id: user_id,
            action,
            timestamp: Utc::now(),
            ip_address: client.and_then(ClientInfo::ip_string),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_codes_match_serde_names() {
        for action in AuditAction::ALL {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json, action.as_str());
            assert_eq!(AuditAction::from_code(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::from_code("bogus"), None);
    }

    #[test]
    fn test_failed_login_records_reason() {
        let client = ClientInfo::new("10.0.0.1".parse().ok(), "agent");
        let entry = LoginHistory::failure(None, &client, "invalid_credentials");
        assert!(!entry.successful);
        assert_eq!(entry.metadata["reason"], "invalid_credentials");
        assert_eq!(entry.ip_address.as_deref(), Some("10.0.0.1"));
    }
}
