//! Route definitions.

pub mod agent;
pub mod health;
pub mod session;
pub mod user;

use crate::error::ApiError;
use crate::middleware::auth::require_bearer;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the full API router.
pub fn create_router(state: AppState) -> Router {
    let sessions = Router::new()
        .route("/api/session/create", post(session::create))
        .route("/api/session/authenticate", get(session::authenticate))
        .route("/api/session/changePermissions", post(session::change_permissions))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/api/user/register", post(user::register))
        .route("/api/user/login", post(user::login))
        .route("/api/agent/register", post(agent::register))
        .route("/api/agent/login", post(agent::login))
        .merge(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Return the value of a required request field, rejecting absent or blank values.
pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{field} is required"))),
    }
}
