//! Two-Factor Entities
//!
//! TOTP devices and backup code records. Only confirmed devices take part
//! in login.

use chrono::{DateTime, Utc};
use kernel::id::{DeviceId, UserId};
use uuid::Uuid;

use crate::domain::value_object::{backup_code::BackupCodeHash, totp_secret::TotpSecret};

pub const DEVICE_TYPE_TOTP: &str = "totp";

#[derive(Debug, Clone)]
pub struct TwoFactorDevice {
    pub device_id: DeviceId,
    pub user_id: UserId,
    pub device_type: String,
    pub secret: TotpSecret,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl TwoFactorDevice {
    /// New unconfirmed TOTP device with a fresh secret
    pub fn new_totp(user_id: UserId) -> Self {
        Self {
            device_id: DeviceId::new(),
            user_id,
            device_type: DEVICE_TYPE_TOTP.to_string(),
            secret: TotpSecret::generate(),
            confirmed: false,
            created_at: Utc::now(),
        }
    }
}

/// Stored backup code. `used` flips to true once and stays there.
#[derive(Debug, Clone)]
pub struct BackupCodeRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub code_hash: BackupCodeHash,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl BackupCodeRecord {
    pub fn new(user_id: UserId, code_hash: BackupCodeHash) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            code_hash,
            used: false,
            created_at: Utc::now(),
        }
    }
}
