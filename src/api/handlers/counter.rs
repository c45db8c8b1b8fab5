use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{run_blocking, store_error};
use crate::api::response::ApiError;
use crate::gate::{authorize, bearer_token, ADMIN_ONLY, ANY_ROLE};
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CounterResponse {
    pub value: u64,
}

/// Public read
pub async fn get_counter(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CounterResponse>, ApiError> {
    let store = state.store.clone();
    let value = run_blocking(move || store.counter().get())
        .await?
        .map_err(|e| store_error(e, "Failed to get counter"))?;

    tracing::debug!(value, "Counter query");
    Ok(Json(CounterResponse { value }))
}

pub async fn increment_counter(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CounterResponse>, ApiError> {
    let identity = authorize(&state.tokens, bearer_token(&headers), ANY_ROLE)?;

    let store = state.store.clone();
    let value = run_blocking(move || store.counter().increment())
        .await?
        .map_err(|e| store_error(e, "Failed to increment counter"))?;

    tracing::debug!(username = %identity.username, value, "Counter incremented");
    Ok(Json(CounterResponse { value }))
}

pub async fn reset_counter(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CounterResponse>, ApiError> {
    let identity = authorize(&state.tokens, bearer_token(&headers), ADMIN_ONLY)?;

    let store = state.store.clone();
    run_blocking(move || store.counter().reset())
        .await?
        .map_err(|e| store_error(e, "Failed to reset counter"))?;

    tracing::info!(username = %identity.username, "Counter reset");
    Ok(Json(CounterResponse { value: 0 }))
}
