//! Blocking hash derivation and verification.

use crate::error::CredentialError;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::fmt;
use subtle::ConstantTimeEq;

/// Random salt length in bytes.
pub const SALT_BYTES: usize = 16;

/// Derived key length in bytes.
pub const KEY_BYTES: usize = 64;

/// PBKDF2 rounds used unless configured otherwise.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Length of a stored credential hash in hex characters.
pub const HASH_HEX_LEN: usize = (KEY_BYTES + SALT_BYTES) * 2;

const SALT_HEX_LEN: usize = SALT_BYTES * 2;
const KEY_HEX_LEN: usize = KEY_BYTES * 2;

/// A hex-encoded salt.
///
/// The hex text itself is the PBKDF2 salt input, so hashes stay verifiable
/// by any implementation that stores the same layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt(String);

impl Salt {
    /// Generate a fresh random salt.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Accept a salt given as 32 hex characters.
    pub fn from_hex(hex_salt: &str) -> Result<Self, CredentialError> {
        if hex_salt.len() != SALT_HEX_LEN {
            return Err(CredentialError::InvalidSalt(format!(
                "expected {SALT_HEX_LEN} hex characters, got {}",
                hex_salt.len()
            )));
        }
        if !hex_salt.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CredentialError::InvalidSalt(
                "salt contains non-hex characters".into(),
            ));
        }
        Ok(Self(hex_salt.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Well-formed record standing in for a missing account's hash.
///
/// Verified against when an account is missing, so that a lookup miss costs
/// the same derivation as a wrong password.
pub const DECOY_RECORD: &str =
    "5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a0f1e2d3c4b5a69788796a5b4c3d2e1f0";

/// A stored credential hash: derived key hex followed by salt hex.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHash")
            .field("salt", &self.salt_hex())
            .finish_non_exhaustive()
    }
}

impl CredentialHash {
    /// Validate a stored record.
    pub fn parse(record: &str) -> Result<Self, CredentialError> {
        if record.len() != HASH_HEX_LEN {
            return Err(CredentialError::CorruptCredentialRecord(format!(
                "expected {HASH_HEX_LEN} characters, got {}",
                record.len()
            )));
        }
        if !record.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CredentialError::CorruptCredentialRecord(
                "record contains non-hex characters".into(),
            ));
        }
        Ok(Self(record.to_string()))
    }

    pub fn key_hex(&self) -> &str {
        &self.0[..KEY_HEX_LEN]
    }

    pub fn salt_hex(&self) -> &str {
        &self.0[KEY_HEX_LEN..]
    }

    /// The salt this record was derived with.
    pub fn salt(&self) -> Salt {
        Salt(self.salt_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Decode the whole record to bytes.
    fn to_bytes(&self) -> Result<Vec<u8>, CredentialError> {
        hex::decode(&self.0).map_err(|e| CredentialError::CorruptCredentialRecord(e.to_string()))
    }
}

impl fmt::Display for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive a credential hash. Deterministic for a given secret, salt and round count.
pub fn derive_hash(secret: &str, salt: &Salt, iterations: u32) -> CredentialHash {
    let mut key = [0u8; KEY_BYTES];
    pbkdf2_hmac::<Sha512>(secret.as_bytes(), salt.as_str().as_bytes(), iterations, &mut key);

    let mut record = hex::encode(key);
    record.push_str(salt.as_str());
    CredentialHash(record)
}

/// Check an entered secret against a stored record.
///
/// Returns `Ok(false)` on mismatch; only an unreadable record is an error.
pub fn verify_hash(secret: &str, stored: &str, iterations: u32) -> Result<bool, CredentialError> {
    let stored = CredentialHash::parse(stored)?;
    let recomputed = derive_hash(secret, &stored.salt(), iterations);

    let expected = stored.to_bytes()?;
    let actual = recomputed.to_bytes()?;
    Ok(bool::from(expected.ct_eq(&actual)))
}
