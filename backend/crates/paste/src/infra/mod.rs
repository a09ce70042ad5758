//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod autodetect;
pub mod linguist;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod postgres;

pub use autodetect::CommandDetector;
pub use linguist::{load_catalogue, load_catalogue_or_minimal};
pub use postgres::PgPasteRepository;
