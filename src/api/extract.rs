// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON body extractor answering in the API error envelope.
//!
//! Wraps [`axum::Json`] so a body that fails to parse or has a wrongly typed
//! field answers 400 `{error, error_code, fields?}` instead of axum's plain
//! text 422.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(rejection_to_error(rejection))
            }
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(e) => match offending_field(&e.body_text()) {
            Some(field) => ApiError::invalid_field(field, "Invalid value"),
            None => ApiError::bad_request("Invalid JSON: wrong types for one or more fields"),
        },
        JsonRejection::JsonSyntaxError(_) => ApiError::bad_request("Invalid JSON body"),
        JsonRejection::MissingJsonContentType(_) => ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_media_type",
            "Expected request with `Content-Type: application/json`",
        ),
        other => ApiError::new(other.status(), "bad_request", other.body_text()),
    }
}

/// Field path named by a data error, e.g. `startDate` in
/// `"...target type: startDate: input contains invalid characters"`.
fn offending_field(body_text: &str) -> Option<&str> {
    let detail = body_text.strip_prefix(DATA_ERROR_PREFIX)?;
    let (path, _) = detail.split_once(": ")?;
    let plausible = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    plausible.then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http};
    use chrono::NaiveDate;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        #[serde(default)]
        name: String,
        #[serde(default)]
        start_date: Option<NaiveDate>,
    }

    fn json_request(body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn extract(request: Request) -> Result<Sample, ApiError> {
        ValidatedJson::<Sample>::from_request(request, &())
            .await
            .map(|ValidatedJson(value)| value)
    }

    #[tokio::test]
    async fn valid_body_is_extracted() {
        let sample = extract(json_request(r#"{"name":"a","startDate":"2026-02-01"}"#))
            .await
            .unwrap();
        assert_eq!(sample.name, "a");
        assert_eq!(sample.start_date, NaiveDate::from_ymd_opt(2026, 2, 1));
    }

    #[tokio::test]
    async fn wrong_type_names_the_field() {
        let err = extract(json_request(r#"{"name":12345}"#)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code, "validation_error");
        assert!(err.fields.unwrap().contains_key("name"));
    }

    #[tokio::test]
    async fn unparseable_date_names_the_field() {
        let err = extract(json_request(r#"{"startDate":"tomorrow"}"#))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.fields.unwrap().contains_key("startDate"));
    }

    #[tokio::test]
    async fn syntax_error_is_bad_request() {
        let err = extract(json_request("{not json")).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code, "bad_request");
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("{}"))
            .unwrap();
        let err = extract(request).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn offending_field_ignores_pathless_errors() {
        assert_eq!(
            offending_field(&format!("{DATA_ERROR_PREFIX}password: invalid type: integer `1`")),
            Some("password")
        );
        assert_eq!(
            offending_field(&format!("{DATA_ERROR_PREFIX}invalid type: sequence, expected struct")),
            None
        );
        assert_eq!(offending_field("something else"), None);
    }
}
