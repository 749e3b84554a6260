// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration input validation.
//!
//! Every field is checked before anything is reported, so a client sees all
//! of its mistakes in one response.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::config::DEFAULT_MIN_PASSWORD_LENGTH;
use crate::models::RegisterRequest;

static EMAIL_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").ok());

/// Field name → human-readable message.
pub type FieldErrors = BTreeMap<String, String>;

/// Canonical form used for storage and lookup: trimmed, NFKC, lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

/// Syntactic plausibility only: something@something.something.
pub fn is_plausible_email(email: &str) -> bool {
    EMAIL_REGEX
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

/// A registration that passed validation.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub name: String,
    /// Normalised email.
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationPolicy {
    pub min_password_length: usize,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

impl RegistrationPolicy {
    pub fn new(min_password_length: usize) -> Self {
        Self {
            min_password_length,
        }
    }

    pub fn validate(&self, request: RegisterRequest) -> Result<ValidRegistration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = request.name.trim().to_string();
        if name.is_empty() {
            errors.insert("name".into(), "Name is required".into());
        }

        let email = normalize_email(&request.email);
        if email.is_empty() {
            errors.insert("email".into(), "Email is required".into());
        } else if !is_plausible_email(&email) {
            errors.insert("email".into(), "Email is invalid".into());
        }

        // Counted in characters, not bytes.
        if request.password.chars().count() < self.min_password_length {
            errors.insert(
                "password".into(),
                format!(
                    "Password must be at least {} characters",
                    self.min_password_length
                ),
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidRegistration {
            name,
            email,
            password: request.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn password_length_boundary() {
        let policy = RegistrationPolicy::default();

        let errors = policy
            .validate(request("Ann", "ann@x.com", "12345"))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["password"], "Password must be at least 6 characters");

        assert!(policy.validate(request("Ann", "ann@x.com", "123456")).is_ok());
    }

    #[test]
    fn password_length_counts_characters() {
        let policy = RegistrationPolicy::default();
        // Six characters, more than six bytes.
        assert!(policy.validate(request("Ann", "ann@x.com", "éééééé")).is_ok());
        assert!(policy.validate(request("Ann", "ann@x.com", "ééééé")).is_err());
    }

    #[test]
    fn all_fields_are_reported_together() {
        let errors = RegistrationPolicy::default()
            .validate(request("  ", "nope", "1"))
            .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors["name"], "Name is required");
        assert_eq!(errors["email"], "Email is invalid");
        assert!(errors.contains_key("password"));
    }

    #[test]
    fn missing_email_is_required_not_invalid() {
        let errors = RegistrationPolicy::default()
            .validate(request("Ann", "   ", "secret"))
            .unwrap_err();
        assert_eq!(errors["email"], "Email is required");
    }

    #[test]
    fn configurable_minimum() {
        let policy = RegistrationPolicy::new(10);
        assert!(policy.validate(request("Ann", "ann@x.com", "secret")).is_err());
        assert!(policy.validate(request("Ann", "ann@x.com", "longsecret")).is_ok());
    }

    #[test]
    fn valid_registration_is_normalised() {
        let valid = RegistrationPolicy::default()
            .validate(request(" Ann ", "  Ann@X.COM ", "secret"))
            .unwrap();
        assert_eq!(valid.name, "Ann");
        assert_eq!(valid.email, "ann@x.com");
    }

    #[test]
    fn normalize_email_applies_nfkc() {
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!(normalize_email("ＡＮＮ@x.com"), "ann@x.com");
    }

    #[test]
    fn plausible_email_shapes() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("a b@c.d e"));
        assert!(!is_plausible_email("@b.co"));
    }
}
