// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderName,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_auth, AuthenticatedUser},
    error::ApiError,
    models::{
        AssignTaskRequest, CreateProjectRequest, CreateSprintRequest, CreateTaskRequest,
        LoginRequest, RegisterRequest, UpdateTaskStatusRequest,
    },
    state::AppState,
    storage::{
        AccessError, AuditEvent, AuditEventType, AuditRepository, OwnershipCheck, Project,
        ProjectRepository, TaskPriority, TaskStatus, UserResponse,
    },
};

pub mod auth;
pub mod extract;
pub mod health;
pub mod projects;
pub mod sprints;
pub mod tasks;
pub mod users;
pub mod views;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness));

    let protected_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::get_current_user))
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/projects/{projectId}", get(projects::get_project))
        .route(
            "/sprints",
            get(sprints::list_sprints).post(sprints::create_sprint),
        )
        .route(
            "/sprints/project/{projectId}",
            get(sprints::list_project_sprints),
        )
        .route(
            "/sprints/{sprintId}/details",
            get(sprints::get_sprint_details),
        )
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/tasks/project/{projectId}", get(tasks::list_project_tasks))
        .route("/tasks/sprint/{sprintId}", get(tasks::list_sprint_tasks))
        .route("/tasks/{taskId}/status", put(tasks::update_task_status))
        .route("/tasks/{taskId}/assign", put(tasks::assign_task))
        .route("/tasks/{taskId}/unassign", put(tasks::unassign_task))
        .route(
            "/tasks/{taskId}/sprint/{sprintId}",
            put(tasks::add_task_to_sprint),
        )
        .route(
            "/tasks/{taskId}/removeSprint",
            put(tasks::remove_task_from_sprint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Turn a failed ownership lookup into a response, auditing denials.
pub(crate) fn deny(
    state: &AppState,
    user: &AuthenticatedUser,
    resource_type: &str,
    resource_id: &str,
    error: AccessError,
) -> ApiError {
    if matches!(error, AccessError::Forbidden { .. }) {
        tracing::warn!(
            user_id = %user.user_id,
            resource_type,
            resource_id,
            "Ownership check failed"
        );
        AuditRepository::new(&state.storage).record(
            AuditEvent::new(AuditEventType::PermissionDenied)
                .with_user(&user.user_id)
                .with_resource(resource_type, resource_id)
                .failed(error.to_string()),
        );
    }
    error.into()
}

/// A referenced project must exist and belong to the caller. `None` is a
/// global (unscoped) reference and always passes.
pub(crate) fn require_owned_project(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Option<&str>,
) -> Result<(), ApiError> {
    let Some(project_id) = project_id else {
        return Ok(());
    };
    ProjectRepository::new(&state.storage)
        .get(project_id)
        .verify_owner(user)
        .map(|_| ())
        .map_err(|e| deny(state, user, "project", project_id, e))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        health::health,
        health::liveness,
        users::list_users,
        users::get_current_user,
        projects::create_project,
        projects::list_projects,
        projects::get_project,
        sprints::create_sprint,
        sprints::list_sprints,
        sprints::list_project_sprints,
        sprints::get_sprint_details,
        tasks::create_task,
        tasks::list_tasks,
        tasks::list_project_tasks,
        tasks::list_sprint_tasks,
        tasks::update_task_status,
        tasks::assign_task,
        tasks::unassign_task,
        tasks::add_task_to_sprint,
        tasks::remove_task_from_sprint
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            auth::RegisterResponse,
            auth::LoginResponse,
            UserResponse,
            CreateProjectRequest,
            Project,
            CreateSprintRequest,
            views::ProjectSummary,
            views::SprintView,
            sprints::SprintDetailsResponse,
            CreateTaskRequest,
            UpdateTaskStatusRequest,
            AssignTaskRequest,
            views::TaskView,
            TaskStatus,
            TaskPriority,
            health::ReadyResponse,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "User directory"),
        (name = "Projects", description = "Project management"),
        (name = "Sprints", description = "Sprint planning"),
        (name = "Tasks", description = "Task tracking"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;
