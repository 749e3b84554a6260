// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User credential repository.
//!
//! ## Storage Layout
//!
//! ```text
//! <data>/users/{user_id}.json         # StoredUser (includes password hash)
//! <data>/user_emails/{email_key}.json # EmailIndexEntry, one per address
//! ```
//!
//! The email index is what makes addresses unique: it is created with
//! create-new semantics before the user document is written, so two
//! concurrent registrations for the same address cannot both succeed.
//! Callers pass emails already normalised by `auth::validation::normalize_email`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::{paths::is_document_id, DocumentStore, StorageError, StorageResult};

/// Credential record. Never serialized to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: String,
    pub name: String,
    /// Normalised email address.
    pub email: String,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public user fields returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailIndexEntry {
    user_id: String,
    email: String,
}

/// Deterministic, filesystem-safe key for an email address.
pub fn email_key(normalized_email: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("mailto:{normalized_email}").as_bytes())
        .simple()
        .to_string()
}

/// Repository for user credential records.
pub struct UserRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> UserRepository<'a> {
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    pub fn exists(&self, user_id: &str) -> bool {
        is_document_id(user_id) && self.storage.exists(self.storage.paths().user(user_id))
    }

    /// Get a user by ID.
    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        if !is_document_id(user_id) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        let path = self.storage.paths().user(user_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.read_json(path)
    }

    /// Look up a user by normalised email.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let index_path = self.storage.paths().user_email(&email_key(email));
        let entry: EmailIndexEntry = match self.storage.read_json(index_path) {
            Ok(entry) => entry,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        match self.get(&entry.user_id) {
            Ok(user) if user.email == email => Ok(Some(user)),
            // Index entry left behind by a failed registration.
            Ok(_) | Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create a new user, reserving the email first.
    ///
    /// Returns `StorageError::AlreadyExists` if the email is taken.
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        let index_path = self.storage.paths().user_email(&email_key(&user.email));
        let entry = EmailIndexEntry {
            user_id: user.id.clone(),
            email: user.email.clone(),
        };

        match self.storage.create_json(&index_path, &entry) {
            Ok(()) => {}
            Err(StorageError::AlreadyExists(_)) => {
                // A stale entry whose user document was never written may be reclaimed.
                if self.find_by_email(&user.email)?.is_some() {
                    return Err(StorageError::AlreadyExists(format!("Email {}", user.email)));
                }
                self.storage.write_json(&index_path, &entry)?;
            }
            Err(e) => return Err(e),
        }

        if let Err(e) = self.storage.write_json(self.storage.paths().user(&user.id), user) {
            let _ = self.storage.delete(&index_path);
            return Err(e);
        }
        Ok(())
    }

    /// List every user, oldest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredUser>> {
        let mut users: Vec<StoredUser> = self.storage.list_json(self.storage.paths().users_dir())?;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }
}
