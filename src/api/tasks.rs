// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Task endpoints.
//!
//! Every single-task mutation loads the task and checks ownership first, so
//! a foreign task id answers 403 and an unknown one 404 before any body
//! field is looked at.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    auth::{Auth, AuthenticatedUser},
    error::ApiError,
    models::{AssignTaskRequest, CreateTaskRequest, UpdateTaskStatusRequest},
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, AuditRepository, OwnershipCheck, SprintRepository, Task,
        TaskPriority, TaskRepository, TaskStatus, UserRepository,
    },
};

use super::{
    deny,
    extract::ValidatedJson,
    require_owned_project,
    views::{ReferenceResolver, TaskView},
};

const INVALID_STATUS: &str = "Invalid status value";

/// Create a task, optionally scoped to a project and/or sprint.
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskView),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Project or sprint belongs to another user"),
        (status = 404, description = "Project, sprint or assignee not found")
    )
)]
pub async fn create_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskView>), ApiError> {
    let mut errors = BTreeMap::new();

    let title = request.title.trim().to_string();
    if title.is_empty() {
        errors.insert("title".to_string(), "Title is required".to_string());
    }
    let status = match request.status.as_deref() {
        None => Some(TaskStatus::default()),
        Some(raw) => TaskStatus::parse(raw),
    };
    if status.is_none() {
        errors.insert("status".to_string(), INVALID_STATUS.to_string());
    }
    let priority = match request.priority.as_deref() {
        None => Some(TaskPriority::default()),
        Some(raw) => TaskPriority::parse(raw),
    };
    if priority.is_none() {
        errors.insert("priority".to_string(), "Invalid priority value".to_string());
    }
    let (Some(status), Some(priority), true) = (status, priority, errors.is_empty()) else {
        return Err(ApiError::validation(errors));
    };

    require_owned_project(&state, &user, request.project_id.as_deref())?;
    if let Some(sprint_id) = request.sprint_id.as_deref() {
        require_owned_sprint(&state, &user, sprint_id)?;
    }
    if let Some(assignee) = request.assigned_to.as_deref() {
        require_user(&state, assignee)?;
    }

    let now = Utc::now();
    let task = Task {
        id: uuid::Uuid::new_v4().to_string(),
        project_id: request.project_id,
        sprint_id: request.sprint_id,
        title,
        description: request.description,
        status,
        priority,
        assigned_to: request.assigned_to,
        created_by: user.user_id.clone(),
        created_at: now,
        updated_at: now,
    };

    TaskRepository::new(&state.storage).create(&task)?;

    crate::audit_log!(
        &state.storage,
        AuditEventType::TaskCreated,
        &user.user_id,
        "task",
        &task.id
    );

    let view = ReferenceResolver::new(&state.storage).task(task)?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/tasks",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tasks created by the caller", body = [TaskView]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_tasks(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let tasks = TaskRepository::new(&state.storage).list_by_creator(&user.user_id)?;
    Ok(Json(ReferenceResolver::new(&state.storage).tasks(tasks)?))
}

#[utoipa::path(
    get,
    path = "/tasks/project/{projectId}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(
        ("projectId" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "The caller's tasks in the project", body = [TaskView]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_project_tasks(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let tasks = TaskRepository::new(&state.storage).list_by_project(&project_id, &user.user_id)?;
    Ok(Json(ReferenceResolver::new(&state.storage).tasks(tasks)?))
}

#[utoipa::path(
    get,
    path = "/tasks/sprint/{sprintId}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(
        ("sprintId" = String, Path, description = "Sprint ID")
    ),
    responses(
        (status = 200, description = "The caller's tasks in the sprint", body = [TaskView]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_sprint_tasks(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(sprint_id): Path<String>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let tasks = TaskRepository::new(&state.storage).list_by_sprint(&sprint_id, &user.user_id)?;
    Ok(Json(ReferenceResolver::new(&state.storage).tasks(tasks)?))
}

/// Move a task to another workflow state.
#[utoipa::path(
    put,
    path = "/tasks/{taskId}/status",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(
        ("taskId" = String, Path, description = "Task ID")
    ),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskView),
        (status = 400, description = "Invalid status value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not authorized to access this task"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update_task_status(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateTaskStatusRequest>,
) -> Result<Json<TaskView>, ApiError> {
    let mut task = owned_task(&state, &user, &task_id)?;
    let status = TaskStatus::parse(&request.status)
        .ok_or_else(|| ApiError::bad_request(INVALID_STATUS))?;

    task.status = status;
    save_task(&state, &user, &mut task, "status")
}

/// Assign a task to a user. A blank or missing `userId` unassigns it.
#[utoipa::path(
    put,
    path = "/tasks/{taskId}/assign",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(
        ("taskId" = String, Path, description = "Task ID")
    ),
    request_body = AssignTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not authorized to access this task"),
        (status = 404, description = "Task or user not found")
    )
)]
pub async fn assign_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    ValidatedJson(request): ValidatedJson<AssignTaskRequest>,
) -> Result<Json<TaskView>, ApiError> {
    let mut task = owned_task(&state, &user, &task_id)?;
    if let Some(assignee) = request.user_id.as_deref() {
        require_user(&state, assignee)?;
    }

    task.assigned_to = request.user_id;
    save_task(&state, &user, &mut task, "assignee")
}

#[utoipa::path(
    put,
    path = "/tasks/{taskId}/unassign",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(
        ("taskId" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Updated task", body = TaskView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not authorized to access this task"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn unassign_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskView>, ApiError> {
    let mut task = owned_task(&state, &user, &task_id)?;
    task.assigned_to = None;
    save_task(&state, &user, &mut task, "assignee")
}

/// Move a task into one of the caller's sprints.
#[utoipa::path(
    put,
    path = "/tasks/{taskId}/sprint/{sprintId}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(
        ("taskId" = String, Path, description = "Task ID"),
        ("sprintId" = String, Path, description = "Sprint ID")
    ),
    responses(
        (status = 200, description = "Updated task", body = TaskView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Task or sprint belongs to another user"),
        (status = 404, description = "Task or sprint not found")
    )
)]
pub async fn add_task_to_sprint(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path((task_id, sprint_id)): Path<(String, String)>,
) -> Result<Json<TaskView>, ApiError> {
    let mut task = owned_task(&state, &user, &task_id)?;
    require_owned_sprint(&state, &user, &sprint_id)?;

    task.sprint_id = Some(sprint_id);
    save_task(&state, &user, &mut task, "sprint")
}

#[utoipa::path(
    put,
    path = "/tasks/{taskId}/removeSprint",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(
        ("taskId" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Updated task", body = TaskView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not authorized to access this task"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn remove_task_from_sprint(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskView>, ApiError> {
    let mut task = owned_task(&state, &user, &task_id)?;
    task.sprint_id = None;
    save_task(&state, &user, &mut task, "sprint")
}

fn owned_task(state: &AppState, user: &AuthenticatedUser, task_id: &str) -> Result<Task, ApiError> {
    TaskRepository::new(&state.storage)
        .get(task_id)
        .verify_owner(user)
        .map_err(|e| deny(state, user, "task", task_id, e))
}

fn require_owned_sprint(
    state: &AppState,
    user: &AuthenticatedUser,
    sprint_id: &str,
) -> Result<(), ApiError> {
    SprintRepository::new(&state.storage)
        .get(sprint_id)
        .verify_owner(user)
        .map(|_| ())
        .map_err(|e| deny(state, user, "sprint", sprint_id, e))
}

fn require_user(state: &AppState, user_id: &str) -> Result<(), ApiError> {
    if UserRepository::new(&state.storage).exists(user_id) {
        Ok(())
    } else {
        Err(ApiError::not_found("User not found"))
    }
}

fn save_task(
    state: &AppState,
    user: &AuthenticatedUser,
    task: &mut Task,
    change: &str,
) -> Result<Json<TaskView>, ApiError> {
    TaskRepository::new(&state.storage).update(task)?;

    AuditRepository::new(&state.storage).record(
        AuditEvent::new(AuditEventType::TaskUpdated)
            .with_user(&user.user_id)
            .with_resource("task", &task.id)
            .with_details(serde_json::json!({ "change": change })),
    );

    Ok(Json(ReferenceResolver::new(&state.storage).task(task.clone())?))
}
