//! Infrastructure Layer
//!
//! Database implementations and the in-memory store used by tests.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryBlogRepository;
pub use postgres::PgBlogRepository;
