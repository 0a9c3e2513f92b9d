//! # warrant-core
//!
//! Configuration types shared across all Warrant crates.
//!
//! A deployment is described by a single `warrant.yaml` file; every section is
//! optional and falls back to defaults suitable for local development.

pub mod config;

pub use config::{
    ConfigError, CredentialsConfig, LoggingConfig, ServerConfig, SignatureScope, StoreBackend,
    StoreConfig, TokenConfig, WarrantConfig,
};
