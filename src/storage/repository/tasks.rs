// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Task repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{
    paths::is_document_id, DocumentStore, OwnedResource, StorageError, StorageResult,
};

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do", alias = "todo")]
    ToDo,
    #[serde(rename = "In Progress", alias = "in-progress")]
    InProgress,
    #[serde(rename = "Done", alias = "done")]
    Done,
}

impl TaskStatus {
    /// Parse a client-supplied status, accepting the legacy lowercase names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "To Do" | "todo" => Some(Self::ToDo),
            "In Progress" | "in-progress" => Some(Self::InProgress),
            "Done" | "done" => Some(Self::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Low" | "low" => Some(Self::Low),
            "Medium" | "medium" => Some(Self::Medium),
            "High" | "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub sprint_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Task {
    const KIND: &'static str = "task";

    fn created_by(&self) -> &str {
        &self.created_by
    }
}

pub struct TaskRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> TaskRepository<'a> {
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    pub fn get(&self, task_id: &str) -> StorageResult<Task> {
        if !is_document_id(task_id) {
            return Err(StorageError::NotFound(format!("Task {task_id}")));
        }
        let path = self.storage.paths().task(task_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Task {task_id}")));
        }
        self.storage.read_json(path)
    }

    pub fn create(&self, task: &Task) -> StorageResult<()> {
        self.storage
            .create_json(self.storage.paths().task(&task.id), task)
    }

    /// Overwrite an existing task, bumping `updated_at`.
    pub fn update(&self, task: &mut Task) -> StorageResult<()> {
        task.updated_at = Utc::now();
        self.storage
            .write_json(self.storage.paths().task(&task.id), task)
    }

    pub fn list_by_creator(&self, user_id: &str) -> StorageResult<Vec<Task>> {
        self.list_where(|t| t.created_by == user_id)
    }

    pub fn list_by_project(&self, project_id: &str, user_id: &str) -> StorageResult<Vec<Task>> {
        self.list_where(|t| t.created_by == user_id && t.project_id.as_deref() == Some(project_id))
    }

    pub fn list_by_sprint(&self, sprint_id: &str, user_id: &str) -> StorageResult<Vec<Task>> {
        self.list_where(|t| t.created_by == user_id && t.sprint_id.as_deref() == Some(sprint_id))
    }

    fn list_where(&self, keep: impl Fn(&Task) -> bool) -> StorageResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .storage
            .list_json::<Task>(self.storage.paths().tasks_dir())?
            .into_iter()
            .filter(|t| keep(t))
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }
}
