// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Payload carried inside an access token.
///
/// Serialized with the registered JWT claim names (`sub`, `iat`, `exp`);
/// both timestamps are UNIX seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityClaim {
    #[serde(rename = "sub")]
    pub user_id: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// Authenticated user extracted from a verified token.
///
/// Inserted into request extensions by the auth middleware and read back by
/// the [`Auth`](super::Auth) extractor. Handlers only ever see a user that
/// passed signature and expiry checks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Stable user id (the token subject).
    pub user_id: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<IdentityClaim> for AuthenticatedUser {
    fn from(claim: IdentityClaim) -> Self {
        Self {
            user_id: claim.user_id,
            issued_at: claim.issued_at,
            expires_at: claim.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_uses_registered_names_on_the_wire() {
        let claim = IdentityClaim {
            user_id: "u1".into(),
            issued_at: 100,
            expires_at: 200,
        };
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json, serde_json::json!({ "sub": "u1", "iat": 100, "exp": 200 }));
    }

    #[test]
    fn authenticated_user_from_claim() {
        let user = AuthenticatedUser::from(IdentityClaim {
            user_id: "u1".into(),
            issued_at: 100,
            expires_at: 200,
        });
        assert_eq!(user.user_id, "u1");
        assert_eq!(user.expires_at, 200);
    }
}
