use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{run_blocking, store_error};
use crate::api::response::{ApiError, AppJson};
use crate::gate::{authorize, bearer_token, ANY_ROLE};
use crate::storage::models::{Role, User};
use crate::storage::{Store, StoreError};
use crate::tokens::{check_length, PasswordHasher};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct Credentials {
    pub password: String,
    pub username: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub role: Role,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
    pub old_password: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<Credentials>,
) -> Result<StatusCode, ApiError> {
    if req.username.trim().is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }
    check_password_length(&req.password)?;

    let store = state.store.clone();
    let username = req.username.clone();
    run_blocking(move || store.users().create(&req.username, &req.password, Role::User))
        .await?
        .map_err(|e| store_error(e, "Could not create user"))?;

    tracing::debug!(username = %username, "User registered");
    Ok(StatusCode::CREATED)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    // No length check here: an oversized password simply fails to match
    let store = state.store.clone();
    let username = req.username.clone();
    let user = run_blocking(move || verified_user(&store, &req.username, &req.password))
        .await?
        .map_err(|e| store_error(e, "Internal error"))?
        .ok_or_else(|| {
            tracing::warn!(username = %username, "Failed login attempt");
            ApiError::unauthorized("Invalid username or password")
        })?;

    let token = state
        .tokens
        .issue(&user.username, user.role, state.config.tokens.ttl())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to issue token");
            ApiError::internal("Internal error")
        })?;

    tracing::debug!(username = %user.username, "User logged in");
    Ok(Json(LoginResponse {
        role: user.role,
        token,
    }))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<AppJson<ChangePasswordRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    // Authenticate before looking at the body
    let identity = authorize(&state.tokens, bearer_token(&headers), ANY_ROLE)?;
    let AppJson(req) = payload?;

    check_password_length(&req.old_password)?;
    check_password_length(&req.new_password)?;

    let store = state.store.clone();
    let username = identity.username.clone();
    run_blocking(move || {
        store
            .users()
            .change_password(&username, &req.old_password, &req.new_password)
    })
    .await?
    .map_err(|e| match e {
        StoreError::InvalidCredentials => {
            tracing::warn!(username = %identity.username, "Wrong old password on password change");
            ApiError::unauthorized("Invalid old password")
        }
        e => store_error(e, "Could not update password"),
    })?;

    tracing::debug!(username = %identity.username, "User changed password");
    Ok(StatusCode::OK)
}

// ============================================================================
// Helpers
// ============================================================================

fn check_password_length(password: &str) -> Result<(), ApiError> {
    check_length(password).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// The stored user if `password` matches; unknown users and wrong passwords
/// both yield `None` so callers cannot tell them apart.
fn verified_user(
    store: &Store,
    username: &str,
    password: &str,
) -> Result<Option<User>, StoreError> {
    match store.users().get(username) {
        Ok(user) if PasswordHasher::verify(password, &user.password_hash) => Ok(Some(user)),
        Ok(_) | Err(StoreError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}
