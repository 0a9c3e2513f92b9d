//! User registration and login.

use super::required;
use crate::error::ApiError;
use crate::response::{AccessToken, ApiResponse};
use crate::state::AppState;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Deserialize;
use tracing::{info, warn};
use warrant_store::{StoreError, UserProfile};
use warrant_token::UserClaims;

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

const ALREADY_REGISTERED: &str = "Already registered, consider signing in!";
const BAD_LOGIN: &str = "Incorrect username or password!";

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AccessToken>>, ApiError> {
    let Json(body) = payload?;
    let username = required(&body.username, "username")?;
    let name = required(&body.name, "name")?;
    let email = required(&body.email, "email")?;
    let password = required(&body.password, "password")?;

    let profiles = state.profiles();
    if profiles.lookup_profile(username).await?.is_some()
        || profiles.find_profile_by_email(email).await?.is_some()
    {
        return Err(ApiError::Conflict(ALREADY_REGISTERED.into()));
    }

    let hash = state.hasher().hash(password).await?;
    let profile = UserProfile::new(username, name, email, hash.into_string());
    profiles
        .insert_profile(profile)
        .await
        .map_err(|e| match e {
            StoreError::AlreadyExists(_) => {
                ApiError::Conflict(ALREADY_REGISTERED.into())
            }
            other => other.into(),
        })?;

    info!(username, "Registered user");

    let access_token = state.issue_token(&UserClaims {
        username: username.to_string(),
    })?;
    Ok(Json(ApiResponse::ok(
        "Registration Successful!",
        AccessToken { access_token },
    )))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AccessToken>>, ApiError> {
    let Json(body) = payload?;
    let username = required(&body.username, "username")?;
    let password = required(&body.password, "password")?;

    let Some(profile) = state.profiles().lookup_profile(username).await? else {
        warn!(username, "Login for unknown user");
        state.hasher().verify_missing(password).await?;
        return Err(ApiError::Unauthorized(BAD_LOGIN.into()));
    };

    if !state.hasher().verify(password, &profile.password).await? {
        warn!(username, "Login with wrong password");
        return Err(ApiError::Unauthorized(BAD_LOGIN.into()));
    }

    let access_token = state.issue_token(&UserClaims {
        username: profile.username,
    })?;
    Ok(Json(ApiResponse::ok(
        "Login Successful!",
        AccessToken { access_token },
    )))
}
