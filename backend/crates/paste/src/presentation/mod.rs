//! Presentation Layer
//!
//! HTTP handlers, DTOs, router and encryption key lookup.

pub mod dto;
pub mod encryption;
pub mod handlers;
pub mod router;

pub use handlers::PasteAppState;
pub use router::{paste_router, paste_router_generic};
