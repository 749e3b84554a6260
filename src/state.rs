// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{RegistrationPolicy, TokenCodec};
use crate::config::TokenConfig;
use crate::storage::DocumentStore;

/// Shared handler state. Cloning is cheap; everything heavy sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<DocumentStore>,
    pub tokens: Arc<TokenCodec>,
    pub registration: RegistrationPolicy,
}

impl AppState {
    /// `storage` must already be initialized.
    pub fn new(storage: DocumentStore, tokens: TokenConfig) -> Self {
        Self {
            storage: Arc::new(storage),
            tokens: Arc::new(TokenCodec::new(tokens)),
            registration: RegistrationPolicy::default(),
        }
    }

    pub fn with_registration_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.registration = policy;
        self
    }
}

/// Fresh state over a temporary data directory.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
    use crate::storage::StoragePaths;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let mut storage = DocumentStore::new(StoragePaths::new(temp_dir.path()));
    storage.initialize().expect("Failed to initialize storage");

    let state = AppState::new(
        storage,
        TokenConfig {
            secret: b"unit-test-secret-0123456789".to_vec(),
            ttl_secs: 3600,
        },
    );
    (state, temp_dir)
}
