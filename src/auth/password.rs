// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification.
//!
//! Argon2id with a random salt per password, stored in PHC string format.
//! Both operations are CPU-bound; async callers run them on the blocking pool.

use std::sync::LazyLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hash failed: {0}")]
    Hash(argon2::password_hash::Error),
    #[error("invalid password hash: {0}")]
    InvalidHash(argon2::password_hash::Error),
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash compared against when the email is unknown, so a failed login costs
/// the same whether or not the account exists.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("dummy-password-for-timing").ok());

/// Hash a password, returning `$argon2id$v=19$m=...,t=...,p=...$salt$hash`.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash. A mismatch is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::InvalidHash(e)),
    }
}

/// Burn one verification's worth of work. Always "fails".
pub fn verify_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] on the blocking pool. `None` hash runs [`verify_dummy`].
pub async fn verify_password_blocking(
    password: String,
    hash: Option<String>,
) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            verify_dummy(&password);
            Ok(false)
        }
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_phc_argon2id_and_salted() {
        let hash = hash_password("test_password").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        let hash2 = hash_password("test_password").unwrap();
        assert_ne!(hash, hash2);
    }

    #[test]
    fn verify_correct_and_wrong_password() {
        let hash = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn verify_invalid_hash_is_error() {
        assert!(verify_password("password", "not_a_valid_hash").is_err());
    }

    #[test]
    fn unicode_password() {
        let password = "пароль密码🔐";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[tokio::test]
    async fn blocking_helpers() {
        let hash = hash_password_blocking("secret".into()).await.unwrap();
        assert!(verify_password_blocking("secret".into(), Some(hash)).await.unwrap());
        assert!(!verify_password_blocking("secret".into(), None).await.unwrap());
    }
}
