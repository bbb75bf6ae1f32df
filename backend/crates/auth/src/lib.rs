//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Registration with email verification
//! - Login by email or username, optional TOTP second factor and backup codes
//! - JWT access tokens backed by revocable server-side sessions
//! - Stateless password reset tokens
//! - Login history and audit log
//! - Profile editing, data export and deferred account deactivation
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Verification tokens and backup codes stored only as hashes
//! - Unknown users, wrong passwords and inactive accounts answer identically

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::jobs::{AuthJob, AuthJobHandler};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAuthRepository, PgAuthRepository};
pub use presentation::middleware::{AuthMiddlewareState, authenticate};
pub use presentation::router::{auth_router, auth_router_generic};
