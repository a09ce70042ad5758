//! Platform crate: technical building blocks shared by the domain crates.

pub mod cookie;
pub mod crypto;
pub mod http_client;
pub mod text;
