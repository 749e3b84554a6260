// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! PMS Server - project management REST backend
//!
//! Users, projects, sprints and tasks stored as JSON documents, behind
//! stateless bearer-token authentication and creator-based ownership checks.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, auth middleware, password hashing, registration rules
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup
//! - `storage` - File-backed document store, repositories, ownership policy, audit log

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
