//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC, Base64, random tokens)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Client metadata (IP, User-Agent) and cookie handling
//! - Key-value cache with in-memory and Redis backends
//! - Fixed-window rate limiting on top of the cache
//! - Background task queue and outbound mail
//! - Environment-driven configuration helpers

pub mod cache;
pub mod client;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod mail;
pub mod password;
pub mod rate_limit;
pub mod tasks;
