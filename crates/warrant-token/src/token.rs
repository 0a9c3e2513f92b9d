//! Token creation and verification.

use crate::claims::{Claims, EXPIRE_AT_CLAIM};
use crate::error::TokenError;
use crate::secret::SigningSecret;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;
use warrant_core::SignatureScope;

/// `typ` header value used unless the issuer is configured otherwise.
pub const DEFAULT_TOKEN_TYPE: &str = "MyJWT";

/// Token lifetime used when no explicit `expireAt` is requested.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Base64url without padding on encode; padded input is tolerated on decode.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

type HmacSha256 = Hmac<Sha256>;

/// HMAC hash function named in the token header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    #[default]
    Sha256,
}

impl Algorithm {
    /// Header name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
        }
    }

    /// Look up an algorithm by header name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sha256" => Some(Algorithm::Sha256),
            _ => None,
        }
    }
}

/// The decoded first segment of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

/// Per-token overrides for [`TokenIssuer::issue`].
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    /// Signing algorithm.
    pub alg: Algorithm,
    /// `typ` header value; the issuer's default when unset.
    pub typ: Option<String>,
    /// Absolute expiry in Unix seconds; `now + ttl` when unset.
    pub expire_at: Option<i64>,
}

impl IssueOptions {
    /// Expire at the given Unix timestamp.
    pub fn expire_at(mut self, expire_at: i64) -> Self {
        self.expire_at = Some(expire_at);
        self
    }

    /// Override the `typ` header.
    pub fn typ(mut self, typ: impl Into<String>) -> Self {
        self.typ = Some(typ.into());
        self
    }
}

/// Compute the hex signature over the encoded header and payload segments.
fn sign(
    secret: &SigningSecret,
    alg: Algorithm,
    scope: SignatureScope,
    header_segment: &str,
    payload_segment: &str,
) -> Result<String, TokenError> {
    let digest = match alg {
        Algorithm::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
                .map_err(|e| TokenError::InvalidSecret(e.to_string()))?;
            mac.update(header_segment.as_bytes());
            if scope == SignatureScope::Dotted {
                mac.update(b".");
            }
            mac.update(payload_segment.as_bytes());
            mac.finalize().into_bytes()
        }
    };
    Ok(hex::encode(digest))
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(SEGMENT_ENGINE.encode(json))
}

fn decode_segment<T: DeserializeOwned>(segment: &str, name: &str) -> Result<T, TokenError> {
    let bytes = SEGMENT_ENGINE
        .decode(segment)
        .map_err(|e| TokenError::MalformedToken(format!("{name} is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::MalformedToken(format!("{name} is not a JSON object: {e}")))
}

/// Split a token into its three segments.
fn split_segments(token: &str) -> Result<(&str, &str, &str), TokenError> {
    if !token.contains('.') {
        return Err(TokenError::MalformedToken("missing segment separators".into()));
    }

    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok((header, payload, signature)),
        _ => Err(TokenError::MalformedToken(
            "expected exactly three segments".into(),
        )),
    }
}

/// Separate the expiry from the rest of the payload, keeping claim order.
fn take_expiry(payload: Map<String, Value>) -> Result<(Claims, Option<i64>), TokenError> {
    let mut expire_at = None;
    let mut claims = Map::new();
    for (key, value) in payload {
        if key == EXPIRE_AT_CLAIM {
            let seconds = value.as_i64().ok_or_else(|| {
                TokenError::MalformedToken(format!("{EXPIRE_AT_CLAIM} is not an integer"))
            })?;
            expire_at = Some(seconds);
        } else {
            claims.insert(key, value);
        }
    }
    Ok((Claims::from(claims), expire_at))
}

/// Issues signed tokens.
pub struct TokenIssuer {
    secret: SigningSecret,
    scope: SignatureScope,
    ttl: Duration,
    token_type: String,
}

impl TokenIssuer {
    /// Create a new token issuer with the given secret.
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            scope: SignatureScope::default(),
            ttl: DEFAULT_TTL,
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
        }
    }

    /// Select which bytes the signature covers.
    pub fn with_scope(mut self, scope: SignatureScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the default token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the default `typ` header value.
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// Default token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token, computing the default expiry from the current time.
    pub fn issue(&self, claims: &Claims, options: &IssueOptions) -> Result<String, TokenError> {
        self.issue_at(claims, options, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    ///
    /// The result depends only on the claims, options, secret and `now`.
    pub fn issue_at(
        &self,
        claims: &Claims,
        options: &IssueOptions,
        now: i64,
    ) -> Result<String, TokenError> {
        let ttl_seconds = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let expire_at = options
            .expire_at
            .unwrap_or_else(|| now.saturating_add(ttl_seconds));

        let header = TokenHeader {
            alg: options.alg.as_str().to_string(),
            typ: options
                .typ
                .clone()
                .unwrap_or_else(|| self.token_type.clone()),
        };

        // A caller claim named `expireAt` is overwritten.
        let mut payload = claims.as_map().clone();
        payload.insert(EXPIRE_AT_CLAIM.to_string(), Value::from(expire_at));

        let header_segment = encode_segment(&header)?;
        let payload_segment = encode_segment(&payload)?;
        let signature = sign(
            &self.secret,
            options.alg,
            self.scope,
            &header_segment,
            &payload_segment,
        )?;

        Ok(format!("{header_segment}.{payload_segment}.{signature}"))
    }
}

/// Verifier for signed tokens.
pub struct TokenVerifier {
    secret: SigningSecret,
    scope: SignatureScope,
    algorithm: Algorithm,
}

impl TokenVerifier {
    /// Create a new token verifier with the given secret.
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            scope: SignatureScope::default(),
            algorithm: Algorithm::default(),
        }
    }

    /// Select which bytes the signature covers. Must match the issuer.
    pub fn with_scope(mut self, scope: SignatureScope) -> Self {
        self.scope = scope;
        self
    }

    /// Verify a token against the current time and extract its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now` (Unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let (header_segment, payload_segment, signature) = split_segments(token)?;

        let header: TokenHeader = decode_segment(header_segment, "header")?;
        if Algorithm::from_name(&header.alg) != Some(self.algorithm) {
            return Err(TokenError::MalformedToken(format!(
                "unsupported algorithm '{}'",
                header.alg
            )));
        }

        let expected = sign(
            &self.secret,
            self.algorithm,
            self.scope,
            header_segment,
            payload_segment,
        )?;
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(TokenError::InvalidSignature);
        }

        let payload: Map<String, Value> = decode_segment(payload_segment, "payload")?;
        let (claims, expire_at) = take_expiry(payload)?;
        if let Some(expired_at) = expire_at {
            if expired_at < now {
                return Err(TokenError::TokenExpired { expired_at });
            }
        }

        Ok(claims)
    }
}

/// Inspect a token without verification (for debugging).
pub fn inspect_token_unverified(token: &str) -> Result<TokenInfo, TokenError> {
    let (header_segment, payload_segment, signature) = split_segments(token)?;

    let header: TokenHeader = decode_segment(header_segment, "header")?;
    let payload: Map<String, Value> = decode_segment(payload_segment, "payload")?;
    let (claims, expire_at) = take_expiry(payload)?;

    Ok(TokenInfo {
        header,
        claims,
        expire_at,
        signature: signature.to_string(),
    })
}

/// Information about a token (for inspection).
#[derive(Debug, Clone)]
pub struct TokenInfo {
    /// Decoded header.
    pub header: TokenHeader,
    /// Claims without `expireAt`.
    pub claims: Claims,
    /// Expiry, if the payload carries one.
    pub expire_at: Option<i64>,
    /// Presented signature, unchecked.
    pub signature: String,
}

impl TokenInfo {
    /// Check whether the token would be rejected as expired at `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expire_at.is_some_and(|exp| exp < now)
    }
}
