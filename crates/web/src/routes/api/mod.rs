//! JSON API handlers.
//!
//! Every failure, including a malformed body, answers with
//! `{"error": "..."}` and the matching status code.

pub mod applications;
pub mod events;
pub mod forms;

use std::str::FromStr;

use axum::extract::FromRequest;
use serde::{Deserialize, Deserializer};

use crate::error::{ApiError, AppError};

/// JSON body extractor whose rejection is an [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Marks a key as present, keeping `null` distinct from absence.
///
/// Use with `#[serde(default)]` so a missing key stays `None`.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Parse an ID taken from the path.
///
/// An ID that is not a UUID cannot name a record, so it is reported as
/// `404` with `"{what} not found"`.
pub(crate) fn path_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("{what} not found")))
}
