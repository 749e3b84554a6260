// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for owner-scoped resources.
//!
//! Two strategies coexist:
//!
//! - Single-resource routes fetch by id, then check ownership here. A missing
//!   resource is `NotFound`; a resource owned by someone else is `Forbidden`.
//!   The distinction is observable (403 vs 404) and intentional.
//! - Collection routes never fetch-then-check. Repositories filter by creator
//!   id (`list_by_creator` and friends) so foreign documents never leave the
//!   store.

use crate::auth::AuthenticatedUser;

use super::StorageError;

/// The ownership rule: plain equality of creator id and requester id.
pub fn can_access(created_by: &str, requester_user_id: &str) -> bool {
    created_by == requester_user_id
}

/// Trait for resources that record their creator.
pub trait OwnedResource {
    /// Lower-case resource name used in user-facing messages.
    const KIND: &'static str;

    /// The `createdBy` user id, set once at creation.
    fn created_by(&self) -> &str;
}

/// Outcome of a failed ownership-guarded lookup.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("{} not found", capitalized(.kind))]
    NotFound { kind: &'static str },
    #[error("Not authorized to access this {kind}")]
    Forbidden { kind: &'static str },
    #[error(transparent)]
    Storage(StorageError),
}

fn capitalized(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Extension trait combining "does it exist" and "may this user see it".
pub trait OwnershipCheck<T> {
    /// Verify existence, then ownership, and return the resource if authorized.
    fn verify_owner(self, user: &AuthenticatedUser) -> Result<T, AccessError>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Result<T, StorageError> {
    fn verify_owner(self, user: &AuthenticatedUser) -> Result<T, AccessError> {
        let resource = match self {
            Ok(resource) => resource,
            Err(StorageError::NotFound(_)) => return Err(AccessError::NotFound { kind: T::KIND }),
            Err(e) => return Err(AccessError::Storage(e)),
        };
        if can_access(resource.created_by(), &user.user_id) {
            Ok(resource)
        } else {
            Err(AccessError::Forbidden { kind: T::KIND })
        }
    }
}
