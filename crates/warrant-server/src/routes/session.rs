//! Agent sessions: a user grants an agent permissions and the agent receives
//! a token carrying them.
//!
//! Tokens issued before a permission change stay valid until they expire.

use super::required;
use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedClaims;
use crate::response::{AccessToken, ApiResponse};
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::info;
use warrant_store::StoreError;
use warrant_token::SessionClaims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentQuery {
    pub agent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePermissionsRequest {
    pub new_permissions: Option<Vec<String>>,
}

const TOKEN_CREATED: &str = "Access_token Successfully Created!";

fn no_grant(agent_id: &str) -> ApiError {
    ApiError::NotFound(format!("no session exists for agent {agent_id}"))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedClaims>,
    Query(query): Query<AgentQuery>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AccessToken>>, ApiError> {
    let agent_id = required(&query.agent_id, "agentId")?;
    let username = auth.username()?;
    let Json(body) = payload?;
    let permissions = body
        .permissions
        .ok_or_else(|| ApiError::BadRequest("permissions is required".into()))?;

    let grant = state
        .profiles()
        .append_agent_grant(username, agent_id, permissions)
        .await
        .map_err(|e| match e {
            StoreError::AlreadyExists(_) => ApiError::Conflict("A session already exists!".into()),
            other => other.into(),
        })?;

    info!(username, agent_id, permissions = ?grant.permissions, "Created agent session");

    let access_token = state.issue_token(&SessionClaims::new(username, grant.permissions))?;
    Ok(Json(ApiResponse::ok(TOKEN_CREATED, AccessToken { access_token })))
}

pub async fn authenticate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedClaims>,
    Query(query): Query<AgentQuery>,
) -> Result<Json<ApiResponse<AccessToken>>, ApiError> {
    let agent_id = required(&query.agent_id, "agentId")?;
    let username = auth.username()?;

    let grant = state
        .profiles()
        .find_agent_grant(username, agent_id)
        .await?
        .ok_or_else(|| no_grant(agent_id))?;

    let access_token = state.issue_token(&SessionClaims::new(username, grant.permissions))?;
    Ok(Json(ApiResponse::ok(TOKEN_CREATED, AccessToken { access_token })))
}

pub async fn change_permissions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedClaims>,
    Query(query): Query<AgentQuery>,
    payload: Result<Json<ChangePermissionsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let agent_id = required(&query.agent_id, "agentId")?;
    let username = auth.username()?;
    let Json(body) = payload?;
    let permissions = body
        .new_permissions
        .ok_or_else(|| ApiError::BadRequest("newPermissions is required".into()))?;

    let grant = state
        .profiles()
        .update_agent_grant_permissions(username, agent_id, permissions)
        .await
        .map_err(|e| match e {
            StoreError::NotFound(_) => no_grant(agent_id),
            other => other.into(),
        })?;

    info!(username, agent_id, permissions = ?grant.permissions, "Changed agent permissions");

    Ok(Json(ApiResponse::message("Changed Permissions Successfully!")))
}
