//! Error types for the token crate.

use thiserror::Error;

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token does not have the three-segment, base64url JSON structure.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Recomputed signature does not match the presented one.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token has expired.
    #[error("token expired at {expired_at}")]
    TokenExpired { expired_at: i64 },

    /// Signing secret is unusable.
    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),

    /// Claims are not a JSON object or do not match the expected shape.
    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    /// Failed to serialize a token segment.
    #[error("token serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error (reading/writing secrets).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TokenError {
    /// Whether the error describes a rejected token rather than a local failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            TokenError::MalformedToken(_)
                | TokenError::InvalidSignature
                | TokenError::TokenExpired { .. }
        )
    }
}
