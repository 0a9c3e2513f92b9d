//! CLI command implementations for Warrant.

pub mod config;
pub mod credential;
pub mod secret;
pub mod token;
