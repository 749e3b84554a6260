// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request bodies accepted by the REST API. Stored documents and their
//! response shapes live next to their repositories in
//! [`crate::storage::repository`].
//!
//! ## Optional references
//!
//! Sprints and tasks may point at a project, a sprint or an assignee. Those
//! references are `Option<String>`: absent, `null` and blank strings all
//! normalise to `None` through [`blank_to_none`], and `None` is the named
//! [`UNSCOPED`] default meaning "global, not tied to any project/sprint/user".
//!
//! Required text fields default to empty so a missing field reaches the
//! handler's validation and is reported alongside every other field error.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Value of an optional reference that points at nothing.
pub const UNSCOPED: Option<String> = None;

/// Collapse absent or blank references to [`UNSCOPED`].
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => UNSCOPED,
    }
}

/// Serde adapter applying [`blank_to_none`] while deserializing.
///
/// Used for references and optional free text alike.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(blank_to_none)
}

// =============================================================================
// Auth Models
// =============================================================================

/// Request to register a new account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request to exchange credentials for an access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Project Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    /// Defaults to today (UTC) when omitted.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

// =============================================================================
// Sprint Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSprintRequest {
    /// Owning project; blank or absent creates a global sprint.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

// =============================================================================
// Task Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sprint_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub assigned_to: Option<String>,
    /// "To Do" when omitted.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<String>,
    /// "Medium" when omitted.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTaskStatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Assign a task. A blank or missing `userId` unassigns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_references_collapse_to_unscoped() {
        assert_eq!(blank_to_none(None), None);
        assert_eq!(blank_to_none(Some(String::new())), None);
        assert_eq!(blank_to_none(Some("   ".into())), None);
        assert_eq!(blank_to_none(Some(" p1 ".into())), Some("p1".into()));
    }

    #[test]
    fn sprint_request_project_id_variants() {
        let absent: CreateSprintRequest =
            serde_json::from_str(r#"{"name":"S1","startDate":"2026-01-01","endDate":"2026-01-14"}"#)
                .unwrap();
        assert_eq!(absent.project_id, UNSCOPED);

        let null: CreateSprintRequest = serde_json::from_str(r#"{"projectId":null}"#).unwrap();
        assert_eq!(null.project_id, UNSCOPED);

        let empty: CreateSprintRequest = serde_json::from_str(r#"{"projectId":""}"#).unwrap();
        assert_eq!(empty.project_id, UNSCOPED);

        let set: CreateSprintRequest = serde_json::from_str(r#"{"projectId":"p-1"}"#).unwrap();
        assert_eq!(set.project_id.as_deref(), Some("p-1"));
        assert_eq!(set.start_date, None);
    }

    #[test]
    fn task_request_defaults() {
        let request: CreateTaskRequest = serde_json::from_str(r#"{"title":"Write docs"}"#).unwrap();
        assert_eq!(request.title, "Write docs");
        assert_eq!(request.project_id, None);
        assert_eq!(request.sprint_id, None);
        assert_eq!(request.assigned_to, None);
        assert_eq!(request.status, None);
        assert_eq!(request.priority, None);
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let request: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(request.name, "");
        assert_eq!(request.password, "");
    }
}
