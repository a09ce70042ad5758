//! Presentation Layer
//!
//! HTTP handlers, DTOs and router.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::MetaAppState;
pub use router::{meta_router, meta_router_generic};
