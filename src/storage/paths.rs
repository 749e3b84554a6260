// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the document store layout.

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_DATA_DIR;

/// Whether `id` can name a document inside its collection directory.
///
/// Ids arrive from URLs and request bodies; anything outside
/// `[A-Za-z0-9_-]` (path separators, dots, percent-decoded `%2F`) is refused
/// before a path is built.
pub fn is_document_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Storage path utilities for the document store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all user credential records.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user record.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    /// Directory of the unique email index.
    pub fn user_emails_dir(&self) -> PathBuf {
        self.root.join("user_emails")
    }

    /// Path to the email index entry for an already-derived key.
    pub fn user_email(&self, email_key: &str) -> PathBuf {
        self.user_emails_dir().join(format!("{email_key}.json"))
    }

    // ========== Project Management Paths ==========

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    pub fn project(&self, project_id: &str) -> PathBuf {
        self.projects_dir().join(format!("{project_id}.json"))
    }

    pub fn sprints_dir(&self) -> PathBuf {
        self.root.join("sprints")
    }

    pub fn sprint(&self, sprint_id: &str) -> PathBuf {
        self.sprints_dir().join(format!("{sprint_id}.json"))
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.root.join("tasks")
    }

    pub fn task(&self, task_id: &str) -> PathBuf {
        self.tasks_dir().join(format!("{task_id}.json"))
    }

    // ========== Audit Log Paths ==========

    /// Directory containing audit logs.
    pub fn audit_dir(&self) -> PathBuf {
        self.root.join("audit")
    }

    /// Directory for a specific date's audit logs.
    pub fn audit_date_dir(&self, date: &str) -> PathBuf {
        self.audit_dir().join(date)
    }

    /// Path to a daily audit events file (JSONL format).
    pub fn audit_events_file(&self, date: &str) -> PathBuf {
        self.audit_date_dir(date).join("events.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_use_data_dir() {
        let paths = StoragePaths::default();
        assert_eq!(paths.root(), Path::new("./data"));
    }

    #[test]
    fn custom_root_for_testing() {
        let paths = StoragePaths::new("/tmp/test-data");
        assert_eq!(paths.root(), Path::new("/tmp/test-data"));
        assert_eq!(
            paths.user("u-1"),
            PathBuf::from("/tmp/test-data/users/u-1.json")
        );
    }

    #[test]
    fn document_paths_are_correct() {
        let paths = StoragePaths::new("/data");
        assert_eq!(paths.user_email("abc"), PathBuf::from("/data/user_emails/abc.json"));
        assert_eq!(paths.project("p1"), PathBuf::from("/data/projects/p1.json"));
        assert_eq!(paths.sprint("s1"), PathBuf::from("/data/sprints/s1.json"));
        assert_eq!(paths.task("t1"), PathBuf::from("/data/tasks/t1.json"));
    }

    #[test]
    fn document_ids_cannot_leave_their_collection() {
        assert!(is_document_id("5f0c7a52-3c1e-4b9e-9d1a-0e6f2b7c8d90"));
        assert!(is_document_id("p1"));
        assert!(!is_document_id(""));
        assert!(!is_document_id("../projects/p1"));
        assert!(!is_document_id("..%2Fprojects"));
        assert!(!is_document_id("a/b"));
        assert!(!is_document_id("a.json"));
        assert!(!is_document_id(&"x".repeat(65)));
    }

    #[test]
    fn audit_paths_are_correct() {
        let paths = StoragePaths::new("/data");
        assert_eq!(paths.audit_dir(), PathBuf::from("/data/audit"));
        assert_eq!(
            paths.audit_events_file("2026-01-28"),
            PathBuf::from("/data/audit/2026-01-28/events.jsonl")
        );
    }
}
