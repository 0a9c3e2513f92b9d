//! Token commands.
//!
//! `warrant token issue` - Issue a signed token for a claim set.
//! `warrant token verify` - Verify a token and print its claims.
//! `warrant token inspect` - Decode a token without verifying it.

use anyhow::Context;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;
use warrant_token::{
    Claims, IssueOptions, SignatureScope, SigningSecret, TokenIssuer, TokenVerifier,
    inspect_token_unverified,
};

/// Resolve a signing secret from a file path or the literal secret text.
///
/// An existing path is read as a secret file; anything else is the secret itself.
fn resolve_secret(secret: Option<String>) -> anyhow::Result<SigningSecret> {
    let secret = secret.context(
        "Signing secret not provided. Either pass --secret <secret|path> or set WARRANT_TOKEN_SECRET",
    )?;

    let path = Path::new(&secret);
    if path.is_file() {
        return SigningSecret::load_from_file(path)
            .with_context(|| format!("Failed to load secret from file: {}", path.display()));
    }

    Ok(SigningSecret::new(secret.trim())?)
}

fn scope(dotted: bool) -> SignatureScope {
    if dotted {
        SignatureScope::Dotted
    } else {
        SignatureScope::Concatenated
    }
}

fn format_expiry(expire_at: i64) -> String {
    DateTime::<Utc>::from_timestamp(expire_at, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| expire_at.to_string())
}

/// Issue a token and return it.
pub fn issue(
    secret: Option<String>,
    claims: &str,
    ttl: &str,
    dotted: bool,
) -> anyhow::Result<String> {
    let secret = resolve_secret(secret)?;
    let claims = Claims::from_json(claims).context("--claims must be a JSON object")?;
    let ttl: Duration = humantime::parse_duration(ttl)
        .with_context(|| format!("invalid --ttl '{ttl}'"))?;

    let issuer = TokenIssuer::new(secret)
        .with_scope(scope(dotted))
        .with_ttl(ttl);
    Ok(issuer.issue(&claims, &IssueOptions::default())?)
}

/// Verify a token and return its claims as pretty JSON.
pub fn verify(secret: Option<String>, token: &str, dotted: bool) -> anyhow::Result<String> {
    let secret = resolve_secret(secret)?;
    let verifier = TokenVerifier::new(secret).with_scope(scope(dotted));
    let claims = verifier.verify(token.trim())?;
    Ok(serde_json::to_string_pretty(&claims)?)
}

/// Print a token's header, claims and expiry without checking the signature.
pub fn inspect(token: &str) -> anyhow::Result<()> {
    let info = inspect_token_unverified(token.trim())?;

    println!("Header:");
    println!("  alg: {}", info.header.alg);
    println!("  typ: {}", info.header.typ);
    println!();
    println!("Claims:");
    println!("{}", serde_json::to_string_pretty(&info.claims)?);
    println!();
    match info.expire_at {
        Some(expire_at) => {
            let state = if info.is_expired_at(Utc::now().timestamp()) {
                "expired"
            } else {
                "valid"
            };
            println!("Expires: {} ({state})", format_expiry(expire_at));
        }
        None => println!("Expires: never"),
    }
    println!("Signature: {}", info.signature);
    println!();
    println!("⚠️  The signature was not checked. Use `warrant token verify` for that.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_issue_then_verify() {
        let token = issue(Some("k1".into()), r#"{"username":"alice"}"#, "5m", false).unwrap();
        let claims = verify(Some("k1".into()), &token, false).unwrap();

        let value: serde_json::Value = serde_json::from_str(&claims).unwrap();
        assert_eq!(value, json!({"username": "alice"}));
    }

    #[test]
    fn test_verify_with_wrong_secret_fails() {
        let token = issue(Some("k1".into()), r#"{"username":"alice"}"#, "5m", false).unwrap();
        assert!(verify(Some("k2".into()), &token, false).is_err());
    }

    #[test]
    fn test_scope_must_match() {
        let token = issue(Some("k1".into()), r#"{"a":1}"#, "1h", true).unwrap();
        assert!(verify(Some("k1".into()), &token, true).is_ok());
        assert!(verify(Some("k1".into()), &token, false).is_err());
    }

    #[test]
    fn test_secret_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "file-secret").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let token = issue(Some(path), r#"{"a":1}"#, "5m", false).unwrap();
        assert!(verify(Some("file-secret".into()), &token, false).is_ok());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(issue(None, r#"{"a":1}"#, "5m", false).is_err());
        assert!(issue(Some("k".into()), "[1,2]", "5m", false).is_err());
        assert!(issue(Some("k".into()), r#"{"a":1}"#, "soon", false).is_err());
    }

    #[test]
    fn test_inspect_token() {
        let token = issue(Some("k1".into()), r#"{"username":"alice"}"#, "5m", false).unwrap();
        inspect(&token).unwrap();
        assert!(inspect("garbage").is_err());
    }
}
