// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sprint endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    audit_log,
    auth::Auth,
    error::ApiError,
    models::CreateSprintRequest,
    state::AppState,
    storage::{AuditEventType, OwnershipCheck, Sprint, SprintRepository, TaskRepository},
};

use super::{
    deny,
    extract::ValidatedJson,
    require_owned_project,
    views::{ReferenceResolver, SprintView, TaskView},
};

/// A sprint together with the caller's tasks in it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SprintDetailsResponse {
    pub sprint: SprintView,
    pub tasks: Vec<TaskView>,
}

/// Create a sprint, optionally inside one of the caller's projects.
#[utoipa::path(
    post,
    path = "/sprints",
    tag = "Sprints",
    security(("bearer_auth" = [])),
    request_body = CreateSprintRequest,
    responses(
        (status = 201, description = "Sprint created", body = SprintView),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Project belongs to another user"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn create_sprint(
    Auth(user): Auth,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateSprintRequest>,
) -> Result<(StatusCode, Json<SprintView>), ApiError> {
    let mut errors = BTreeMap::new();
    let name = request.name.trim().to_string();
    if name.is_empty() {
        errors.insert("name".to_string(), "Name is required".to_string());
    }
    if request.start_date.is_none() {
        errors.insert("startDate".to_string(), "Start date is required".to_string());
    }
    if request.end_date.is_none() {
        errors.insert("endDate".to_string(), "End date is required".to_string());
    }
    let (Some(start_date), Some(end_date), true) =
        (request.start_date, request.end_date, errors.is_empty())
    else {
        return Err(ApiError::validation(errors));
    };
    if end_date < start_date {
        return Err(ApiError::invalid_field(
            "endDate",
            "End date must not be before start date",
        ));
    }

    require_owned_project(&state, &user, request.project_id.as_deref())?;

    let now = Utc::now();
    let sprint = Sprint {
        id: uuid::Uuid::new_v4().to_string(),
        project_id: request.project_id,
        name,
        start_date,
        end_date,
        created_by: user.user_id.clone(),
        created_at: now,
        updated_at: now,
    };

    SprintRepository::new(&state.storage).create(&sprint)?;

    audit_log!(
        &state.storage,
        AuditEventType::SprintCreated,
        &user.user_id,
        "sprint",
        &sprint.id
    );

    let view = ReferenceResolver::new(&state.storage).sprint(sprint)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// List the caller's sprints, global and project-bound alike.
#[utoipa::path(
    get,
    path = "/sprints",
    tag = "Sprints",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sprints created by the caller", body = [SprintView]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_sprints(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<SprintView>>, ApiError> {
    let sprints = SprintRepository::new(&state.storage).list_by_creator(&user.user_id)?;
    Ok(Json(ReferenceResolver::new(&state.storage).sprints(sprints)?))
}

#[utoipa::path(
    get,
    path = "/sprints/project/{projectId}",
    tag = "Sprints",
    security(("bearer_auth" = [])),
    params(
        ("projectId" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "The caller's sprints in the project", body = [SprintView]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_project_sprints(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<SprintView>>, ApiError> {
    let sprints =
        SprintRepository::new(&state.storage).list_by_project(&project_id, &user.user_id)?;
    Ok(Json(ReferenceResolver::new(&state.storage).sprints(sprints)?))
}

/// Sprint plus the caller's tasks assigned to it.
#[utoipa::path(
    get,
    path = "/sprints/{sprintId}/details",
    tag = "Sprints",
    security(("bearer_auth" = [])),
    params(
        ("sprintId" = String, Path, description = "Sprint ID")
    ),
    responses(
        (status = 200, description = "Sprint and its tasks", body = SprintDetailsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not authorized to access this sprint"),
        (status = 404, description = "Sprint not found")
    )
)]
pub async fn get_sprint_details(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(sprint_id): Path<String>,
) -> Result<Json<SprintDetailsResponse>, ApiError> {
    let sprint = SprintRepository::new(&state.storage)
        .get(&sprint_id)
        .verify_owner(&user)
        .map_err(|e| deny(&state, &user, "sprint", &sprint_id, e))?;

    let tasks = TaskRepository::new(&state.storage).list_by_sprint(&sprint_id, &user.user_id)?;

    let mut resolver = ReferenceResolver::new(&state.storage);
    Ok(Json(SprintDetailsResponse {
        sprint: resolver.sprint(sprint)?,
        tasks: resolver.tasks(tasks)?,
    }))
}
