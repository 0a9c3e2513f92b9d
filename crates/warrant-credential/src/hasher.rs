//! Async credential hasher backed by a bounded blocking pool.

use crate::error::CredentialError;
use crate::hash::{
    CredentialHash, DECOY_RECORD, DEFAULT_ITERATIONS, Salt, derive_hash, verify_hash,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Semaphore;
use tracing::debug;
use warrant_core::CredentialsConfig;

const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Runs credential derivations off the async runtime.
///
/// Each call acquires a permit, then runs the derivation with
/// `spawn_blocking`. The permit count bounds how many derivations run at
/// once; further callers wait for a permit. A started derivation runs to
/// completion even if the caller drops the future.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    iterations: u32,
    permits: Arc<Semaphore>,
    derivations: Arc<AtomicU64>,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher {
    pub fn new() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            permits: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENCY)),
            derivations: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_config(config: &CredentialsConfig) -> Self {
        Self::new()
            .with_iterations(config.iterations)
            .with_max_concurrency(config.max_concurrent_derivations)
    }

    /// Set the PBKDF2 round count for hashing and verification.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the number of derivations allowed to run at once (at least one).
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(max.max(1)));
        self
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Number of derivations started by this hasher and its clones.
    pub fn derivations(&self) -> u64 {
        self.derivations.load(Ordering::Relaxed)
    }

    /// Hash a secret under a fresh random salt.
    pub async fn hash(&self, secret: &str) -> Result<CredentialHash, CredentialError> {
        self.hash_with_salt(secret, Salt::generate()).await
    }

    /// Hash a secret under the given salt.
    pub async fn hash_with_salt(
        &self,
        secret: &str,
        salt: Salt,
    ) -> Result<CredentialHash, CredentialError> {
        let secret = secret.to_string();
        let iterations = self.iterations;
        self.run(move || Ok(derive_hash(&secret, &salt, iterations)))
            .await
    }

    /// Check an entered secret against a stored record.
    pub async fn verify(&self, secret: &str, stored: &str) -> Result<bool, CredentialError> {
        // Reject unreadable records before taking a permit.
        CredentialHash::parse(stored)?;

        let secret = secret.to_string();
        let stored = stored.to_string();
        let iterations = self.iterations;
        self.run(move || verify_hash(&secret, &stored, iterations))
            .await
    }

    /// Spend a full verification on a credential that has no stored record.
    ///
    /// Always returns `false`. Callers use it when a lookup misses so the
    /// response takes as long as a wrong-password check.
    pub async fn verify_missing(&self, secret: &str) -> Result<bool, CredentialError> {
        self.verify(secret, DECOY_RECORD).await?;
        Ok(false)
    }

    async fn run<T, F>(&self, work: F) -> Result<T, CredentialError>
    where
        F: FnOnce() -> Result<T, CredentialError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| CredentialError::WorkerUnavailable("derivation pool closed".into()))?;

        self.derivations.fetch_add(1, Ordering::Relaxed);
        debug!(
            available = self.permits.available_permits(),
            iterations = self.iterations,
            "Running credential derivation"
        );

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work()
        })
        .await
        .map_err(|e| CredentialError::WorkerUnavailable(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new().with_iterations(10)
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = hasher();
        let stored = hasher.hash("pw123").await.unwrap();

        assert!(hasher.verify("pw123", stored.as_str()).await.unwrap());
        assert!(!hasher.verify("pw124", stored.as_str()).await.unwrap());
    }

    #[tokio::test]
    async fn test_matches_blocking_derivation() {
        let hasher = hasher();
        let salt = Salt::from_hex("ffeeddccbbaa99887766554433221100").unwrap();

        let pooled = hasher.hash_with_salt("secret", salt.clone()).await.unwrap();
        assert_eq!(pooled, derive_hash("secret", &salt, 10));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_error() {
        let err = hasher().verify("pw", "deadbeef").await.unwrap_err();
        assert!(matches!(err, CredentialError::CorruptCredentialRecord(_)));
    }

    #[tokio::test]
    async fn test_config_applies() {
        let config = CredentialsConfig {
            iterations: 42,
            max_concurrent_derivations: 2,
        };
        let hasher = CredentialHasher::from_config(&config);
        assert_eq!(hasher.iterations(), 42);
        assert_eq!(hasher.permits.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_zero_concurrency_clamped() {
        let hasher = hasher().with_max_concurrency(0);
        assert_eq!(hasher.permits.available_permits(), 1);
        assert!(hasher.hash("pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_missing_runs_a_derivation() {
        let hasher = hasher();
        let clone = hasher.clone();

        assert!(!hasher.verify_missing("pw123").await.unwrap());
        assert!(!hasher.verify_missing("").await.unwrap());
        assert_eq!(clone.derivations(), 2);
    }
}
