//! Password hashing configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// PBKDF2 rounds for new and verified hashes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Upper bound on derivations running at the same time.
    #[serde(default = "default_max_concurrent_derivations")]
    pub max_concurrent_derivations: usize,
}

fn default_iterations() -> u32 {
    100_000
}

fn default_max_concurrent_derivations() -> usize {
    4
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            max_concurrent_derivations: default_max_concurrent_derivations(),
        }
    }
}
