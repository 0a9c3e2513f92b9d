//! Agent registration and login.

use super::required;
use crate::error::ApiError;
use crate::response::{AccessToken, AgentRegistered, ApiResponse};
use crate::state::AppState;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Deserialize;
use tracing::{info, warn};
use warrant_store::{AgentIdentity, StoreError};
use warrant_token::AgentClaims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCredentials {
    pub agent_name: Option<String>,
    pub password: Option<String>,
}

const BAD_LOGIN: &str = "Invalid agent agentName or password!";

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<AgentCredentials>, JsonRejection>,
) -> Result<Json<ApiResponse<AgentRegistered>>, ApiError> {
    let Json(body) = payload?;
    let agent_name = required(&body.agent_name, "agentName")?;
    let password = required(&body.password, "password")?;

    if state.agents().find_agent(agent_name).await?.is_some() {
        return Err(ApiError::Conflict(format!("agent {agent_name} is already registered")));
    }

    let hash = state.hasher().hash(password).await?;
    let agent = AgentIdentity::new(agent_name, hash.into_string());
    let agent_uid = agent.agent_uid.clone();

    state.agents().insert_agent(agent).await.map_err(|e| match e {
        StoreError::AlreadyExists(_) => {
            ApiError::Conflict(format!("agent {agent_name} is already registered"))
        }
        other => other.into(),
    })?;

    info!(agent_name, agent_uid = %agent_uid, "Registered agent");

    Ok(Json(ApiResponse::ok(
        "Agent Signup Successful!",
        AgentRegistered { agent_uid },
    )))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<AgentCredentials>, JsonRejection>,
) -> Result<Json<ApiResponse<AccessToken>>, ApiError> {
    let Json(body) = payload?;
    let agent_name = required(&body.agent_name, "agentName")?;
    let password = required(&body.password, "password")?;

    let Some(agent) = state.agents().find_agent(agent_name).await? else {
        warn!(agent_name, "Login for unknown agent");
        state.hasher().verify_missing(password).await?;
        return Err(ApiError::Unauthorized(BAD_LOGIN.into()));
    };

    if !state.hasher().verify(password, &agent.password).await? {
        warn!(agent_name, "Agent login with wrong password");
        return Err(ApiError::Unauthorized(BAD_LOGIN.into()));
    }

    let access_token = state.issue_token(&AgentClaims {
        agent_name: agent.agent_name,
    })?;
    Ok(Json(ApiResponse::ok(
        "Agent Login Successful!",
        AccessToken { access_token },
    )))
}
