use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use warrant_token::{Claims, UserClaims};

/// Claims of the bearer token that authenticated the request.
#[derive(Clone, Debug)]
pub struct AuthenticatedClaims(pub Claims);

impl AuthenticatedClaims {
    /// The `username` of a user login token, required on user-scoped routes.
    ///
    /// Agent and session tokens are refused even when they carry a `username`.
    pub fn username(&self) -> Result<&str, ApiError> {
        let not_a_user = || ApiError::Unauthorized("token does not identify a user".into());
        self.0.to_typed::<UserClaims>().map_err(|_| not_a_user())?;
        self.0.username().ok_or_else(not_a_user)
    }
}

/// Axum middleware requiring a valid `Authorization: Bearer <token>` header.
///
/// The verified claims are inserted as an [`AuthenticatedClaims`] extension.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("login token is required".into()))?;

    let claims = state
        .verifier()
        .verify(token)
        .map_err(|e| ApiError::rejected_token(e, state.expose_token_errors()))?;

    req.extensions_mut().insert(AuthenticatedClaims(claims));
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.123"));
        assert_eq!(extract_bearer(&headers), Some("abc.def.123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_only_user_claims_identify_a_user() {
        let user = AuthenticatedClaims(Claims::new().with("username", "alice"));
        assert_eq!(user.username().unwrap(), "alice");

        let session = AuthenticatedClaims(
            Claims::new()
                .with("permissions", serde_json::json!(["READ"]))
                .with("username", "alice"),
        );
        assert!(matches!(session.username(), Err(ApiError::Unauthorized(_))));

        let agent = AuthenticatedClaims(Claims::new().with("agentName", "crawler"));
        assert!(matches!(agent.username(), Err(ApiError::Unauthorized(_))));
    }
}
