// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Each repository provides the operations for one entity type, using the
//! DocumentStore for all file operations. Collection queries filter by
//! creator inside the repository.

pub mod projects;
pub mod sprints;
pub mod tasks;
pub mod users;

pub use projects::{Project, ProjectRepository};
pub use sprints::{Sprint, SprintRepository};
pub use tasks::{Task, TaskPriority, TaskRepository, TaskStatus};
pub use users::{StoredUser, UserRepository, UserResponse};
