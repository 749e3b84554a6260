// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sprint repository.
//!
//! A sprint with `project_id == None` is global: it belongs to its creator
//! but not to any project.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::super::{
    paths::is_document_id, DocumentStore, OwnedResource, StorageError, StorageResult,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Sprint {
    const KIND: &'static str = "sprint";

    fn created_by(&self) -> &str {
        &self.created_by
    }
}

pub struct SprintRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> SprintRepository<'a> {
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    pub fn get(&self, sprint_id: &str) -> StorageResult<Sprint> {
        if !is_document_id(sprint_id) {
            return Err(StorageError::NotFound(format!("Sprint {sprint_id}")));
        }
        let path = self.storage.paths().sprint(sprint_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Sprint {sprint_id}")));
        }
        self.storage.read_json(path)
    }

    pub fn create(&self, sprint: &Sprint) -> StorageResult<()> {
        self.storage
            .create_json(self.storage.paths().sprint(&sprint.id), sprint)
    }

    /// Sprints created by `user_id`, earliest start first.
    pub fn list_by_creator(&self, user_id: &str) -> StorageResult<Vec<Sprint>> {
        self.list_where(|s| s.created_by == user_id)
    }

    /// Sprints created by `user_id` inside one project.
    pub fn list_by_project(&self, project_id: &str, user_id: &str) -> StorageResult<Vec<Sprint>> {
        self.list_where(|s| s.created_by == user_id && s.project_id.as_deref() == Some(project_id))
    }

    fn list_where(&self, keep: impl Fn(&Sprint) -> bool) -> StorageResult<Vec<Sprint>> {
        let mut sprints: Vec<Sprint> = self
            .storage
            .list_json::<Sprint>(self.storage.paths().sprints_dir())?
            .into_iter()
            .filter(|s| keep(s))
            .collect();
        sprints.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(sprints)
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

    fn test_sprint(id: &str, owner: &str, project_id: Option<&str>, day: u32) -> Sprint {
        let now = Utc::now();
        Sprint {
            id: id.to_string(),
            project_id: project_id.map(str::to_string),
            name: format!("Sprint {id}"),
            start_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, day + 13).unwrap(),
            created_by: owner.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn list_by_project_requires_both_project_and_creator() {
        let (_temp, storage) = test_storage();
        let repo = SprintRepository::new(&storage);

        repo.create(&test_sprint("s1", "ann", Some("p1"), 1)).unwrap();
        repo.create(&test_sprint("s2", "ann", None, 2)).unwrap();
        repo.create(&test_sprint("s3", "bob", Some("p1"), 3)).unwrap();
        repo.create(&test_sprint("s4", "ann", Some("p2"), 4)).unwrap();

        let in_p1: Vec<String> = repo
            .list_by_project("p1", "ann")
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(in_p1, vec!["s1"]);

        let all_ann: Vec<String> = repo
            .list_by_creator("ann")
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(all_ann, vec!["s1", "s2", "s4"]);
    }

    #[test]
    fn global_sprint_round_trips_with_null_project() {
        let (_temp, storage) = test_storage();
        let repo = SprintRepository::new(&storage);

        repo.create(&test_sprint("s1", "ann", None, 1)).unwrap();
        let loaded = repo.get("s1").unwrap();
        assert_eq!(loaded.project_id, None);
    }
}
