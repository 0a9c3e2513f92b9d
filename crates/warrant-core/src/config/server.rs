//! HTTP listener configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8080"
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Report whether a rejected token was expired, tampered with, or malformed.
    ///
    /// Off by default: clients only learn that the token was not accepted.
    #[serde(default)]
    pub expose_token_errors: bool,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            expose_token_errors: false,
        }
    }
}
