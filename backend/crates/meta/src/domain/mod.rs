//! Domain Layer

pub mod entities;
pub mod repository;
pub mod services;

pub use entities::{Announcement, AppStats, GithubRelease, Release, WeeklyPasteStats};
pub use repository::{MetaRepository, MetaStore, ReleaseSource};
