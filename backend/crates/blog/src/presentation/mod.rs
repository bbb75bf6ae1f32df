//! Presentation Layer
//!
//! HTTP handlers, DTOs and routing.

pub mod admin_handlers;
pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::BlogAppState;
pub use router::{blog_router, blog_router_generic, sitemap_router};
