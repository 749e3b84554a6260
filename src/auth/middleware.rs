// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied with `route_layer` to every protected router so it runs before
//! any handler that touches owned resources, and never for register/login.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/projects", get(list_projects))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, AuthenticatedUser, TokenCodec};
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// A missing header, a non-UTF-8 value, another scheme or an empty token are
/// all "no token".
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::NoToken)?
        .to_str()
        .map_err(|_| AuthError::NoToken)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthError::NoToken)?;

    if token.is_empty() {
        return Err(AuthError::NoToken);
    }
    Ok(token)
}

/// Verify the request's bearer token and return its identity.
pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec) -> Result<AuthenticatedUser, AuthError> {
    let token = bearer_token(headers)?;
    let claim = codec.verify(token).map_err(|e| {
        let error = AuthError::from(e);
        tracing::warn!(reason = error.error_code(), "Rejected access token");
        error
    })?;
    Ok(claim.into())
}

/// Authentication middleware function.
///
/// On success the [`AuthenticatedUser`] is inserted into request extensions
/// for the [`Auth`](super::Auth) extractor.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &state.tokens) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
