//! # warrant-token
//!
//! Compact, HMAC-signed bearer tokens for Warrant.
//!
//! This crate provides functionality for:
//! - Issuing tokens that carry a claim set and an expiry
//! - Verifying presented tokens and recovering their claims
//! - Inspecting tokens without verification (for debugging)
//!
//! ## Wire Format
//!
//! ```text
//! base64url(header_json) "." base64url(payload_json) "." hex(hmac_sha256)
//! ```
//!
//! | Segment | Contents |
//! |---------|----------|
//! | Header | `{"alg":"sha256","typ":"MyJWT"}` |
//! | Payload | Caller claims plus `"expireAt": <unix seconds>` |
//! | Signature | Lowercase hex HMAC-SHA256 over the header and payload segments |
//!
//! The verifier pins the algorithm: a header naming anything other than
//! `sha256` is rejected as malformed rather than used to pick a hash function.
//! `expireAt` is added at issuance and stripped from verified claims.

pub mod claims;
pub mod error;
pub mod secret;
pub mod token;

pub use claims::{AgentClaims, Claims, EXPIRE_AT_CLAIM, SessionClaims, UserClaims};
pub use error::TokenError;
pub use secret::SigningSecret;
pub use token::{
    Algorithm, DEFAULT_TOKEN_TYPE, DEFAULT_TTL, IssueOptions, TokenHeader, TokenInfo,
    TokenIssuer, TokenVerifier, inspect_token_unverified,
};
pub use warrant_core::SignatureScope;
