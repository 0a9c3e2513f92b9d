//! Error types for credential hashing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Stored hash does not have the key-plus-salt hex layout.
    #[error("corrupt credential record: {0}")]
    CorruptCredentialRecord(String),

    /// Caller-supplied salt is not 32 hex characters.
    #[error("invalid salt: {0}")]
    InvalidSalt(String),

    /// The derivation pool is closed or a derivation task died.
    #[error("credential worker unavailable: {0}")]
    WorkerUnavailable(String),
}
