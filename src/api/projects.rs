// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project endpoints.
//!
//! Listing filters by creator in the repository; single-project reads fetch
//! then apply the ownership check (404 before 403).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    audit_log,
    auth::Auth,
    error::ApiError,
    models::CreateProjectRequest,
    state::AppState,
    storage::{AuditEventType, OwnershipCheck, Project, ProjectRepository},
};

use super::{deny, extract::ValidatedJson};

/// Create a project owned by the authenticated user.
#[utoipa::path(
    post,
    path = "/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_project(
    Auth(user): Auth,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid_field("name", "Name is required"));
    }

    let now = Utc::now();
    let start_date = request.start_date.unwrap_or_else(|| now.date_naive());
    if let Some(end_date) = request.end_date {
        if end_date < start_date {
            return Err(ApiError::invalid_field(
                "endDate",
                "End date must not be before start date",
            ));
        }
    }

    let project = Project {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: request.description,
        start_date,
        end_date: request.end_date,
        created_by: user.user_id.clone(),
        created_at: now,
        updated_at: now,
    };

    ProjectRepository::new(&state.storage).create(&project)?;

    audit_log!(
        &state.storage,
        AuditEventType::ProjectCreated,
        &user.user_id,
        "project",
        &project.id
    );

    Ok((StatusCode::CREATED, Json(project)))
}

/// List the authenticated user's projects.
#[utoipa::path(
    get,
    path = "/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Projects created by the caller", body = [Project]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_projects(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = ProjectRepository::new(&state.storage).list_by_creator(&user.user_id)?;
    Ok(Json(projects))
}

/// Get a project by ID.
///
/// Returns 403 (not 404) for a project that exists but belongs to someone else.
#[utoipa::path(
    get,
    path = "/projects/{projectId}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(
        ("projectId" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project details", body = Project),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not authorized to access this project"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let project = ProjectRepository::new(&state.storage)
        .get(&project_id)
        .verify_owner(&user)
        .map_err(|e| deny(&state, &user, "project", &project_id, e))?;

    Ok(Json(project))
}
