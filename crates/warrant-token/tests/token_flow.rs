//! End-to-end token scenarios.
//!
//! Run with: cargo test --package warrant-token --test token_flow

use chrono::Utc;
use serde_json::json;
use warrant_token::{
    Claims, IssueOptions, SessionClaims, SigningSecret, TokenError, TokenIssuer, TokenVerifier,
};

fn issuer(secret: &str) -> TokenIssuer {
    TokenIssuer::new(SigningSecret::new(secret).unwrap())
}

fn verifier(secret: &str) -> TokenVerifier {
    TokenVerifier::new(SigningSecret::new(secret).unwrap())
}

/// Alice's token verifies within its lifetime, expires after it, and only
/// verifies under the issuing secret.
#[test]
fn test_alice_scenario() {
    let now = Utc::now().timestamp();
    let claims = Claims::new().with("username", "alice");
    let token = issuer("k1")
        .issue(&claims, &IssueOptions::default().expire_at(now + 300))
        .unwrap();

    let verified = verifier("k1").verify(&token).unwrap();
    assert_eq!(serde_json::to_value(&verified).unwrap(), json!({"username": "alice"}));

    assert!(matches!(
        verifier("k1").verify_at(&token, now + 301),
        Err(TokenError::TokenExpired { .. })
    ));

    assert!(matches!(
        verifier("k2").verify(&token),
        Err(TokenError::InvalidSignature)
    ));
}

/// A token issued already expired is rejected even though its signature is valid.
#[test]
fn test_past_expiry_rejected() {
    let now = Utc::now().timestamp();
    let token = issuer("k1")
        .issue(
            &Claims::new().with("username", "bob"),
            &IssueOptions::default().expire_at(now - 1),
        )
        .unwrap();

    let err = verifier("k1").verify(&token).unwrap_err();
    assert!(matches!(err, TokenError::TokenExpired { expired_at } if expired_at == now - 1));
    assert!(err.is_rejection());
}

/// Claim sets of every JSON shape survive issue then verify unchanged.
#[test]
fn test_round_trip_preserves_claims() {
    let claims = Claims::from_json(
        r#"{"username":"carol","permissions":["READ","WRITE"],"level":3,"nested":{"a":[1,null,true]}}"#,
    )
    .unwrap();

    let token = issuer("secret").issue(&claims, &IssueOptions::default()).unwrap();
    assert_eq!(verifier("secret").verify(&token).unwrap(), claims);
}

/// Session claims carry the permission set granted to an agent.
#[test]
fn test_session_claims_round_trip() {
    let session = SessionClaims::new("dave", vec!["READ".into()]);
    let claims = Claims::from_serializable(&session).unwrap();

    let token = issuer("k1").issue(&claims, &IssueOptions::default()).unwrap();
    let verified: SessionClaims = verifier("k1").verify(&token).unwrap().to_typed().unwrap();

    assert_eq!(verified, session);
}

/// A bare string is rejected before any signature work.
#[test]
fn test_dotless_input_is_malformed() {
    assert!(matches!(
        verifier("k1").verify("Bearer"),
        Err(TokenError::MalformedToken(_))
    ));
}
