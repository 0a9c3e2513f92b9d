//! Configuration types for the Warrant authorization server.
//!
//! Configuration is loaded from a YAML file (`warrant.yaml` by default, or the
//! path in `WARRANT_CONFIG`) into a single [`WarrantConfig`].

pub mod credentials;
pub mod logging;
pub mod server;
pub mod store;
pub mod token;

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use credentials::CredentialsConfig;
pub use logging::LoggingConfig;
pub use server::ServerConfig;
pub use store::{StoreBackend, StoreConfig};
pub use token::{SignatureScope, TokenConfig};

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "WARRANT_CONFIG";

/// Configuration file used when `WARRANT_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "warrant.yaml";

/// Complete Warrant configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarrantConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token signing settings.
    #[serde(default)]
    pub token: TokenConfig,

    /// Password hashing settings.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Profile and agent storage.
    #[serde(default)]
    pub store: StoreConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

impl WarrantConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load the configuration file named by `WARRANT_CONFIG` (or `warrant.yaml`).
    ///
    /// A missing default file yields the default configuration; a missing file
    /// that was named explicitly is an error.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind must not be empty".into()));
        }
        if self.credentials.iterations == 0 {
            return Err(ConfigError::Invalid(
                "credentials.iterations must be greater than zero".into(),
            ));
        }
        if self.credentials.max_concurrent_derivations == 0 {
            return Err(ConfigError::Invalid(
                "credentials.max_concurrent_derivations must be greater than zero".into(),
            ));
        }
        let ttl = self.token.ttl_duration()?;
        if ttl.is_zero() {
            return Err(ConfigError::Invalid("token.ttl must be greater than zero".into()));
        }
        if self.token.token_type.is_empty() {
            return Err(ConfigError::Invalid("token.token_type must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = WarrantConfig::from_yaml("{}").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.credentials.iterations, 100_000);
        assert_eq!(config.token.signature_scope, SignatureScope::Concatenated);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
server:
  bind: "127.0.0.1:9000"
  expose_token_errors: true
token:
  ttl: "10m"
  signature_scope: dotted
store:
  backend: sqlite
  sqlite_path: "/tmp/warrant-test.sqlite"
"#;
        let config = WarrantConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert!(config.server.expose_token_errors);
        assert_eq!(config.token.ttl_duration().unwrap().as_secs(), 600);
        assert_eq!(config.token.signature_scope, SignatureScope::Dotted);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.token.secret_env.as_deref(), Some("WARRANT_TOKEN_SECRET"));
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let config = WarrantConfig::from_yaml("credentials:\n  iterations: 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_bad_ttl() {
        let config = WarrantConfig::from_yaml("token:\n  ttl: \"soon\"\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  level: debug\n  json: true").unwrap();

        let config = WarrantConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_example_config_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../warrant.example.yaml");
        let config = WarrantConfig::from_file(path).unwrap();
        config.validate().unwrap();
        assert_eq!(config.credentials.max_concurrent_derivations, 4);
    }
}
