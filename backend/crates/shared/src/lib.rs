//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - Common primitive value objects (ID types, etc.)
//! - The authenticated caller carried through a request
//! - Page-number pagination shared by every list endpoint
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
#[cfg(feature = "axum")]
pub mod json;
pub mod pagination;
pub mod principal;

pub use error::app_error::{AppError, AppResult};
pub use error::kind::ErrorKind;
pub use principal::Principal;
