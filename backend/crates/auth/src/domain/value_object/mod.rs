//! Value Object Module

pub mod backup_code;
pub mod email;
pub mod role_name;
pub mod totp_secret;
pub mod user_name;
