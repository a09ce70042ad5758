//! Application Layer - Use Cases

pub mod announcements;
pub mod config;
pub mod releases;
pub mod stats;

pub use announcements::{AnnouncementInput, AnnouncementUseCase};
pub use config::{MetaConfig, ReleaseRepo};
pub use releases::ReleasesUseCase;
pub use stats::StatsUseCase;
