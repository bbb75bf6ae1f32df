//! Domain Layer
//!
//! Entities, value objects, pure services, the admin registry and
//! repository traits.

pub mod admin;
pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
