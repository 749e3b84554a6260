// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Project repository.
//!
//! Each project is stored as a separate JSON file under `<data>/projects/`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{
    paths::is_document_id, DocumentStore, OwnedResource, StorageError, StorageResult,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Creator's user id. Set once, never reassigned.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Project {
    const KIND: &'static str = "project";

    fn created_by(&self) -> &str {
        &self.created_by
    }
}

pub struct ProjectRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> ProjectRepository<'a> {
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Get a project by ID.
    pub fn get(&self, project_id: &str) -> StorageResult<Project> {
        if !is_document_id(project_id) {
            return Err(StorageError::NotFound(format!("Project {project_id}")));
        }
        let path = self.storage.paths().project(project_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Project {project_id}")));
        }
        self.storage.read_json(path)
    }

    pub fn create(&self, project: &Project) -> StorageResult<()> {
        self.storage
            .create_json(self.storage.paths().project(&project.id), project)
    }

    /// Projects created by `user_id`, oldest first.
    pub fn list_by_creator(&self, user_id: &str) -> StorageResult<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .storage
            .list_json::<Project>(self.storage.paths().projects_dir())?
            .into_iter()
            .filter(|p| p.created_by == user_id)
            .collect();
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, DocumentStore) {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let mut storage = DocumentStore::new(StoragePaths::new(temp.path()));
        storage.initialize().expect("Failed to initialize");
        (temp, storage)
    }

    fn test_project(id: &str, owner: &str) -> Project {
        let now = Utc::now();
        Project {
            id: id.to_string(),
            name: format!("Project {id}"),
            description: None,
            start_date: now.date_naive(),
            end_date: None,
            created_by: owner.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_and_get_project() {
        let (_temp, storage) = test_storage();
        let repo = ProjectRepository::new(&storage);

        let project = test_project("p1", "ann");
        repo.create(&project).unwrap();

        assert_eq!(repo.get("p1").unwrap(), project);
        assert!(matches!(repo.get("missing"), Err(StorageError::NotFound(_))));
        assert!(matches!(repo.get("../projects/p1"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn list_by_creator_filters_other_users() {
        let (_temp, storage) = test_storage();
        let repo = ProjectRepository::new(&storage);

        // Interleaved creates by two users.
        for i in 0..6 {
            let owner = if i % 2 == 0 { "ann" } else { "bob" };
            repo.create(&test_project(&format!("p{i}"), owner)).unwrap();
        }

        let anns = repo.list_by_creator("ann").unwrap();
        assert_eq!(anns.len(), 3);
        assert!(anns.iter().all(|p| p.created_by == "ann"));

        assert!(repo.list_by_creator("carol").unwrap().is_empty());
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let json = serde_json::to_value(test_project("p1", "ann")).unwrap();
        assert!(json.get("description").is_none());
        assert!(json.get("endDate").is_none());
        assert_eq!(json["createdBy"], "ann");
    }
}
