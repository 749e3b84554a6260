// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login endpoints.
//!
//! These are the only API routes that run without the auth middleware.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    audit_log,
    auth::{
        normalize_email,
        password::{hash_password_blocking, verify_password_blocking},
    },
    error::ApiError,
    models::{LoginRequest, RegisterRequest},
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, AuditRepository, StorageError, StoredUser, UserRepository,
        UserResponse,
    },
};

use super::extract::ValidatedJson;

const DUPLICATE_EMAIL: &str = "Email is already registered";

/// Response after registering.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Response after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user: UserResponse,
}

/// Register a new account.
///
/// Does not log the user in; call `/auth/login` afterwards.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Validation failed (per-field messages)"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let valid = state
        .registration
        .validate(request)
        .map_err(ApiError::validation)?;

    let repo = UserRepository::new(&state.storage);
    if repo.find_by_email(&valid.email)?.is_some() {
        return Err(ApiError::invalid_field("email", DUPLICATE_EMAIL));
    }

    let password_hash = hash_password_blocking(valid.password)
        .await
        .map_err(ApiError::internal)?;

    let user = StoredUser {
        id: uuid::Uuid::new_v4().to_string(),
        name: valid.name,
        email: valid.email,
        password_hash,
        created_at: Utc::now(),
    };

    // The index create is the real uniqueness check; the lookup above only
    // saves hashing for the common case.
    match repo.create(&user) {
        Ok(()) => {}
        Err(StorageError::AlreadyExists(_)) => {
            return Err(ApiError::invalid_field("email", DUPLICATE_EMAIL));
        }
        Err(e) => return Err(ApiError::internal(e)),
    }

    audit_log!(&state.storage, AuditEventType::UserRegistered, &user.id, "user", &user.id);
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// Exchange email and password for an access token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = normalize_email(&request.email);
    let repo = UserRepository::new(&state.storage);

    let user = if email.is_empty() {
        None
    } else {
        repo.find_by_email(&email)?
    };

    let verified = verify_password_blocking(
        request.password,
        user.as_ref().map(|u| u.password_hash.clone()),
    )
    .await;

    let user = match (user, verified) {
        (Some(user), Ok(true)) => user,
        (user, verified) => {
            if let Err(e) = verified {
                // Corrupt stored hash. Still answer like a wrong password.
                tracing::error!(error = %e, "Password verification failed");
            }
            AuditRepository::new(&state.storage).record(
                AuditEvent::new(AuditEventType::AuthFailure)
                    .with_details(serde_json::json!({
                        "reason": "invalid_credentials",
                        "known_user": user.is_some(),
                    }))
                    .failed("invalid credentials"),
            );
            tracing::warn!(reason = "invalid_credentials", "Login rejected");
            return Err(ApiError::invalid_credentials());
        }
    };

    let token = state.tokens.issue(&user.id).map_err(ApiError::internal)?;

    audit_log!(&state.storage, AuditEventType::AuthSuccess, &user.id);
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}
