//! Signing secret management.

use crate::error::TokenError;
use rand::RngCore;
use std::fmt;
use std::path::Path;

/// A shared HMAC secret for signing and verifying tokens.
///
/// The secret is used as raw bytes; a secret read from text (env var, file)
/// keys the HMAC with its UTF-8 encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret {
    bytes: Vec<u8>,
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecret")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl SigningSecret {
    /// Create a secret from raw bytes. Empty secrets are rejected.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(TokenError::InvalidSecret("secret must not be empty".into()));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Generate a new random secret.
    ///
    /// The secret is 32 random bytes rendered as 64 hex characters, so it can
    /// be copied verbatim into an environment variable or file.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);

        Self {
            bytes: hex::encode(bytes).into_bytes(),
        }
    }

    /// Load a secret from an environment variable.
    pub fn from_env(var: &str) -> Result<Self, TokenError> {
        let value = std::env::var(var)
            .map_err(|_| TokenError::InvalidSecret(format!("environment variable {var} is not set")))?;
        Self::new(value)
    }

    /// Load a secret from a file, ignoring surrounding whitespace.
    pub fn load_from_file(path: &Path) -> Result<Self, TokenError> {
        let contents = std::fs::read_to_string(path)?;
        Self::new(contents.trim())
    }

    /// Save the secret to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), TokenError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Get the secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The secret as text, if it is valid UTF-8.
    pub fn expose_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(SigningSecret::new(""), Err(TokenError::InvalidSecret(_))));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = SigningSecret::generate();
        let b = SigningSecret::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_bytes().len(), 64);
        assert!(a.expose_str().unwrap().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_debug_hides_secret() {
        let secret = SigningSecret::new("super-secret-value").unwrap();
        let printed = format!("{secret:?}");
        assert!(!printed.contains("super-secret-value"));
    }

    #[test]
    fn test_secret_file_save_load() {
        let secret = SigningSecret::generate();

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", secret.expose_str().unwrap()).unwrap();

        let loaded = SigningSecret::load_from_file(file.path()).unwrap();
        assert_eq!(secret, loaded);
    }
}
