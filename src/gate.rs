//! Role-based admission for protected operations

use axum::http::{header, HeaderMap};
use thiserror::Error;

use crate::storage::models::Role;
use crate::tokens::{Identity, TokenError, TokenService};

/// Any authenticated account
pub const ANY_ROLE: &[Role] = &[Role::User, Role::Admin];

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    #[error("Forbidden: Insufficient permissions")]
    Forbidden,
    #[error("Unauthorized")]
    Unauthenticated,
}

/// Extract the token from an `Authorization` header. The `Bearer ` prefix is
/// optional; an absent or empty header yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Admit a request carrying `token` if its role is one of `allowed`.
///
/// Missing, malformed, forged and expired tokens are all reported as
/// [`GateError::Unauthenticated`]; the underlying reason is only logged.
pub fn authorize(
    tokens: &TokenService,
    token: Option<&str>,
    allowed: &[Role],
) -> Result<Identity, GateError> {
    let token = token.ok_or_else(|| {
        tracing::debug!("Rejected request without a token");
        GateError::Unauthenticated
    })?;

    let identity = tokens.validate(token).map_err(|e| {
        match &e {
            TokenError::Expired => tracing::debug!("Rejected expired token"),
            _ => tracing::warn!(error = %e, "Rejected invalid token"),
        }
        GateError::Unauthenticated
    })?;

    if !allowed.contains(&identity.role) {
        tracing::warn!(
            username = %identity.username,
            role = %identity.role,
            "Rejected request with insufficient role"
        );
        return Err(GateError::Forbidden);
    }

    Ok(identity)
}
