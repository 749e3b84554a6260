// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Storage Module
//!
//! Persistent storage as plain JSON documents on the local filesystem, one
//! file per record. There is no database: every write is either an atomic
//! temp-file-plus-rename or a create-new, and listings scan a collection
//! directory.
//!
//! ## Storage Layout
//!
//! ```text
//! <DATA_DIR>/
//!   users/{user_id}.json          # Credentials (password hash NEVER exposed via API)
//!   user_emails/{email_key}.json  # Unique email index
//!   projects/{project_id}.json
//!   sprints/{sprint_id}.json
//!   tasks/{task_id}.json
//!   audit/
//!     {date}/events.jsonl         # Daily audit logs
//! ```

pub mod audit;
pub mod document_store;
pub mod ownership;
pub mod paths;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use document_store::{DocumentStore, StorageError, StorageResult};
pub use ownership::{AccessError, OwnedResource, OwnershipCheck};
pub use paths::StoragePaths;
pub use repository::{
    Project, ProjectRepository, Sprint, SprintRepository, StoredUser, Task, TaskPriority,
    TaskRepository, TaskStatus, UserRepository, UserResponse,
};
