// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Task and sprint responses with their references resolved.
//!
//! Stored documents hold bare ids. Responses replace `projectId` with
//! `{id, name}` and `assignedTo`/`createdBy` with `{id, name, email}`. A
//! reference whose target is gone renders as `null`.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{
    DocumentStore, ProjectRepository, Sprint, StorageError, StorageResult, Task, TaskPriority,
    TaskStatus, UserRepository, UserResponse,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SprintView {
    pub id: String,
    /// `null` for a global sprint.
    pub project_id: Option<ProjectSummary>,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_by: Option<UserResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: String,
    pub project_id: Option<ProjectSummary>,
    pub sprint_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<UserResponse>,
    pub created_by: Option<UserResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Builds views, looking each referenced user or project up at most once.
pub struct ReferenceResolver<'a> {
    storage: &'a DocumentStore,
    users: HashMap<String, Option<UserResponse>>,
    projects: HashMap<String, Option<ProjectSummary>>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self {
            storage,
            users: HashMap::new(),
            projects: HashMap::new(),
        }
    }

    pub fn task(&mut self, task: Task) -> StorageResult<TaskView> {
        Ok(TaskView {
            project_id: self.project(task.project_id.as_deref())?,
            assigned_to: self.user(task.assigned_to.as_deref())?,
            created_by: self.user(Some(&task.created_by))?,
            id: task.id,
            sprint_id: task.sprint_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            created_at: task.created_at,
            updated_at: task.updated_at,
        })
    }

    pub fn tasks(&mut self, tasks: Vec<Task>) -> StorageResult<Vec<TaskView>> {
        tasks.into_iter().map(|task| self.task(task)).collect()
    }

    pub fn sprint(&mut self, sprint: Sprint) -> StorageResult<SprintView> {
        Ok(SprintView {
            project_id: self.project(sprint.project_id.as_deref())?,
            created_by: self.user(Some(&sprint.created_by))?,
            id: sprint.id,
            name: sprint.name,
            start_date: sprint.start_date,
            end_date: sprint.end_date,
            created_at: sprint.created_at,
            updated_at: sprint.updated_at,
        })
    }

    pub fn sprints(&mut self, sprints: Vec<Sprint>) -> StorageResult<Vec<SprintView>> {
        sprints.into_iter().map(|sprint| self.sprint(sprint)).collect()
    }

    fn user(&mut self, user_id: Option<&str>) -> StorageResult<Option<UserResponse>> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        if let Some(cached) = self.users.get(user_id) {
            return Ok(cached.clone());
        }
        let resolved = match UserRepository::new(self.storage).get(user_id) {
            Ok(user) => Some(UserResponse::from(user)),
            Err(StorageError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        self.users.insert(user_id.to_string(), resolved.clone());
        Ok(resolved)
    }

    fn project(&mut self, project_id: Option<&str>) -> StorageResult<Option<ProjectSummary>> {
        let Some(project_id) = project_id else {
            return Ok(None);
        };
        if let Some(cached) = self.projects.get(project_id) {
            return Ok(cached.clone());
        }
        let resolved = match ProjectRepository::new(self.storage).get(project_id) {
            Ok(project) => Some(ProjectSummary {
                id: project.id,
                name: project.name,
            }),
            Err(StorageError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        self.projects.insert(project_id.to_string(), resolved.clone());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Project, StoragePaths, StoredUser};
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, DocumentStore) {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let mut storage = DocumentStore::new(StoragePaths::new(temp.path()));
        storage.initialize().expect("Failed to initialize");
        (temp, storage)
    }

    fn seed(storage: &DocumentStore) {
        let now = Utc::now();
        for (id, name, email) in [("u1", "Ann", "ann@x.com"), ("u2", "Bob", "bob@x.com")] {
            UserRepository::new(storage)
                .create(&StoredUser {
                    id: id.into(),
                    name: name.into(),
                    email: email.into(),
                    password_hash: "unused".into(),
                    created_at: now,
                })
                .unwrap();
        }
        ProjectRepository::new(storage)
            .create(&Project {
                id: "p1".into(),
                name: "Apollo".into(),
                description: None,
                start_date: now.date_naive(),
                end_date: None,
                created_by: "u1".into(),
                created_at: now,
                updated_at: now,
            })
            .unwrap();
    }

    fn task(project_id: Option<&str>, assigned_to: Option<&str>) -> Task {
        let now = Utc::now();
        Task {
            id: "t1".into(),
            project_id: project_id.map(str::to_string),
            sprint_id: None,
            title: "Write docs".into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            assigned_to: assigned_to.map(str::to_string),
            created_by: "u1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn task_references_are_populated() {
        let (_temp, storage) = test_storage();
        seed(&storage);

        let view = ReferenceResolver::new(&storage)
            .task(task(Some("p1"), Some("u2")))
            .unwrap();

        assert_eq!(view.project_id.unwrap().name, "Apollo");
        assert_eq!(view.assigned_to.unwrap().email, "bob@x.com");
        assert_eq!(view.created_by.unwrap().name, "Ann");
    }

    #[test]
    fn unscoped_and_dangling_references_are_null() {
        let (_temp, storage) = test_storage();
        seed(&storage);

        let view = ReferenceResolver::new(&storage)
            .task(task(Some("gone"), None))
            .unwrap();
        assert_eq!(view.project_id, None);
        assert_eq!(view.assigned_to, None);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["assignedTo"].is_null());
        assert!(json["projectId"].is_null());
        assert_eq!(json["createdBy"]["email"], "ann@x.com");
    }
}
