//! Value Object Module

pub mod access_token_value;
pub mod scope;
pub mod user_name;
