//! # warrant-credential
//!
//! Salted, iterated credential hashing for user and agent passwords.
//!
//! A stored credential hash is the hex-encoded PBKDF2-HMAC-SHA512 key followed
//! directly by the hex salt:
//!
//! ```text
//! <128 hex chars of derived key><32 hex chars of salt>
//! ```
//!
//! [`derive_hash`] and [`verify_hash`] are blocking. Request handlers should go
//! through [`CredentialHasher`], which runs each derivation on tokio's blocking
//! pool and caps how many run at once.
//!
//! ```ignore
//! use warrant_credential::CredentialHasher;
//!
//! let hasher = CredentialHasher::new().with_max_concurrency(4);
//! let stored = hasher.hash("pw123").await?;
//! assert!(hasher.verify("pw123", stored.as_str()).await?);
//! ```

pub mod error;
pub mod hash;
pub mod hasher;

pub use error::CredentialError;
pub use hash::{
    CredentialHash, DECOY_RECORD, DEFAULT_ITERATIONS, HASH_HEX_LEN, KEY_BYTES, SALT_BYTES, Salt, derive_hash,
    verify_hash,
};
pub use hasher::CredentialHasher;
