// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token issue/verify.
//!
//! Tokens are compact JWS (HS256) signed with the server secret. Verification
//! recomputes the HMAC over the raw `header.payload` text before either
//! segment is parsed, so tampering anywhere in the signed part surfaces as
//! [`TokenError::InvalidSignature`] rather than a parse failure.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use sha2::Sha256;

use super::claims::IdentityClaim;
use crate::config::TokenConfig;

type HmacSha256 = Hmac<Sha256>;

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    InvalidSignature,
}

/// Issues and verifies access tokens with a single shared secret.
pub struct TokenCodec {
    secret: Vec<u8>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            secret: config.secret,
            validation,
            ttl_secs: i64::try_from(config.ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for `user_id`, valid from now for the configured TTL.
    pub fn issue(&self, user_id: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let issued_at = now.timestamp();
        let claim = IdentityClaim {
            user_id: user_id.to_string(),
            issued_at,
            expires_at: issued_at.saturating_add(self.ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claim, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign access token");
            TokenError::Malformed
        })
    }

    /// Verify signature and expiry, returning the embedded claim.
    pub fn verify(&self, token: &str) -> Result<IdentityClaim, TokenError> {
        self.check_signature(token)?;

        decode::<IdentityClaim>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }

    fn check_signature(&self, token: &str) -> Result<(), TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let signature =
            Base64UrlUnpadded::decode_vec(signature).map_err(|_| TokenError::Malformed)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Malformed)?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[redacted]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn codec_with(secret: &str, ttl_secs: u64) -> TokenCodec {
        TokenCodec::new(TokenConfig {
            secret: secret.as_bytes().to_vec(),
            ttl_secs,
        })
    }

    fn codec() -> TokenCodec {
        codec_with("test-secret-0123456789", 3600)
    }

    #[test]
    fn issue_then_verify_round_trip() {
        let codec = codec();
        let now = Utc::now();
        let token = codec.issue_at("user_123", now).unwrap();

        let claim = codec.verify(&token).unwrap();
        assert_eq!(claim.user_id, "user_123");
        assert_eq!(claim.issued_at, now.timestamp());
        assert_eq!(claim.expires_at, now.timestamp() + 3600);
    }

    #[test]
    fn token_past_expiry_is_expired() {
        let codec = codec();
        let issued = Utc::now() - Duration::seconds(3600 + 10);
        let token = codec.issue_at("user_123", issued).unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_inside_ttl_is_accepted() {
        let codec = codec();
        let issued = Utc::now() - Duration::seconds(3600 - 60);
        let token = codec.issue_at("user_123", issued).unwrap();

        assert!(codec.verify(&token).is_ok());
    }

    #[test]
    fn any_altered_character_in_signed_part_is_invalid_signature() {
        let codec = codec();
        let token = codec.issue("user_123").unwrap();
        let signed_len = token.rfind('.').unwrap();

        for (i, c) in token.char_indices().take(signed_len) {
            if c == '.' {
                continue;
            }
            let replacement = if c == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(i..i + 1, &replacement.to_string());

            assert_eq!(
                codec.verify(&tampered),
                Err(TokenError::InvalidSignature),
                "position {i}"
            );
        }
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let token = codec_with("secret-one-0123456789", 3600).issue("user_123").unwrap();
        let other = codec_with("secret-two-0123456789", 3600);

        assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn expired_token_with_wrong_secret_is_invalid_signature() {
        let issued = Utc::now() - Duration::days(30);
        let token = codec_with("secret-one-0123456789", 60)
            .issue_at("user_123", issued)
            .unwrap();

        assert_eq!(
            codec_with("secret-two-0123456789", 60).verify(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.verify(""), Err(TokenError::Malformed));
        assert_eq!(codec.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(codec.verify("a.b"), Err(TokenError::Malformed));
        assert_eq!(codec.verify("a.b.c.d"), Err(TokenError::Malformed));
        assert_eq!(codec.verify("a.b.!!!"), Err(TokenError::Malformed));
    }

    #[test]
    fn correctly_signed_non_json_payload_is_malformed() {
        let secret = "test-secret-0123456789";
        let codec = codec_with(secret, 3600);

        let header = Base64UrlUnpadded::encode_string(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = Base64UrlUnpadded::encode_string(b"not json");
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{header}.{payload}").as_bytes());
        let signature = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        let token = format!("{header}.{payload}.{signature}");
        assert_eq!(codec.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", codec());
        assert!(!rendered.contains("test-secret"));
    }
}
