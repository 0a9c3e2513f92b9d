//! Token signing configuration.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which bytes of a token the HMAC signature covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignatureScope {
    /// `header_segment ++ payload_segment`, with no delimiter.
    ///
    /// Compatible with tokens minted by earlier deployments.
    #[default]
    Concatenated,
    /// `header_segment "." payload_segment`, exactly as transported.
    Dotted,
}

/// Configuration for token issuance and verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Environment variable containing the signing secret.
    #[serde(default = "default_secret_env")]
    pub secret_env: Option<String>,

    /// Path to a file containing the signing secret.
    #[serde(default)]
    pub secret_file: Option<PathBuf>,

    /// Lifetime of newly issued tokens (e.g. "5m", "1h").
    #[serde(default = "default_ttl")]
    pub ttl: String,

    /// Value of the `typ` header field.
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Signed material layout.
    #[serde(default)]
    pub signature_scope: SignatureScope,
}

fn default_secret_env() -> Option<String> {
    Some("WARRANT_TOKEN_SECRET".to_string())
}

fn default_ttl() -> String {
    "5m".to_string()
}

fn default_token_type() -> String {
    "MyJWT".to_string()
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret_env: default_secret_env(),
            secret_file: None,
            ttl: default_ttl(),
            token_type: default_token_type(),
            signature_scope: SignatureScope::default(),
        }
    }
}

impl TokenConfig {
    /// Parse the configured token lifetime.
    pub fn ttl_duration(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(&self.ttl)
            .map_err(|e| ConfigError::Invalid(format!("token.ttl '{}': {e}", self.ttl)))
    }

    /// Resolve the signing secret from environment or file.
    pub fn resolve_secret(&self) -> Result<Option<String>, std::io::Error> {
        // Try environment variable first
        if let Some(env_var) = &self.secret_env {
            if let Ok(secret) = std::env::var(env_var) {
                if !secret.is_empty() {
                    return Ok(Some(secret));
                }
            }
        }

        // Try file path
        if let Some(path) = &self.secret_file {
            if path.exists() {
                let secret = std::fs::read_to_string(path)?;
                return Ok(Some(secret.trim().to_string()));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_ttl_is_five_minutes() {
        assert_eq!(TokenConfig::default().ttl_duration().unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn test_resolve_secret_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  file-secret  ").unwrap();

        let config = TokenConfig {
            secret_env: None,
            secret_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(config.resolve_secret().unwrap().as_deref(), Some("file-secret"));
    }

    #[test]
    fn test_resolve_secret_prefers_env() {
        // SAFETY: We're in a test and controlling the environment
        unsafe {
            std::env::set_var("WARRANT_TEST_SECRET_PREFERS_ENV", "env-secret");
        }

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "file-secret").unwrap();

        let config = TokenConfig {
            secret_env: Some("WARRANT_TEST_SECRET_PREFERS_ENV".to_string()),
            secret_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(config.resolve_secret().unwrap().as_deref(), Some("env-secret"));

        // SAFETY: Cleanup in test
        unsafe {
            std::env::remove_var("WARRANT_TEST_SECRET_PREFERS_ENV");
        }
    }

    #[test]
    fn test_resolve_secret_missing() {
        let config = TokenConfig {
            secret_env: Some("WARRANT_TEST_SECRET_UNSET".to_string()),
            secret_file: None,
            ..Default::default()
        };
        assert!(config.resolve_secret().unwrap().is_none());
    }
}
