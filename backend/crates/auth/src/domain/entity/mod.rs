//! Entity Module

pub mod auth_session;
pub mod credential;
pub mod profile;
pub mod security_log;
pub mod two_factor;
pub mod user;
pub mod verification_token;
