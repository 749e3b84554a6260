// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User directory endpoints.

use axum::{extract::State, Json};

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::{UserRepository, UserResponse},
};

/// List every user's public fields (used to pick task assignees).
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_users(
    Auth(_user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepository::new(&state.storage).list_all()?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// The authenticated user's own profile.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn get_current_user(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let stored = UserRepository::new(&state.storage)
        .get(&user.user_id)
        .map_err(|e| match e {
            crate::storage::StorageError::NotFound(_) => ApiError::not_found("User not found"),
            other => ApiError::internal(other),
        })?;
    Ok(Json(stored.into()))
}
