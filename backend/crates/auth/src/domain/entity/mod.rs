//! Entity Module

pub mod access_token;
pub mod image;
pub mod settings;
pub mod user;
