// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Self-issued bearer tokens for the REST API.
//!
//! ## Flow
//!
//! 1. `POST /auth/register` validates input, hashes the password (Argon2id)
//!    and stores the credential record.
//! 2. `POST /auth/login` verifies the password and issues an HS256 token
//!    carrying `{sub, iat, exp}`.
//! 3. Protected routes run [`require_auth`], which verifies the token and
//!    stores an [`AuthenticatedUser`] in request extensions.
//! 4. Handlers take the [`Auth`] extractor and apply the ownership policy
//!    from [`crate::storage::ownership`].
//!
//! Tokens are stateless: nothing server-side can revoke one before `exp`.
//!
//! ## Configuration
//!
//! - `JWT_SECRET`: signing secret (required)
//! - `JWT_TTL_SECS`: token lifetime, default 24h
//! - `PASSWORD_MIN_LENGTH`: default 6

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod validation;

pub use claims::{AuthenticatedUser, IdentityClaim};
pub use codec::{TokenCodec, TokenError};
pub use error::AuthError;
pub use extractor::Auth;
pub use middleware::{authenticate, require_auth};
pub use validation::{normalize_email, FieldErrors, RegistrationPolicy};
