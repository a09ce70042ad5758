//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - Short base36 ID types shared by every entity
//! - Expiry durations used by pastes and access tokens
//! - The action log written by every domain and read by statistics
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod action_log;
pub mod expires_in;
pub mod id;
