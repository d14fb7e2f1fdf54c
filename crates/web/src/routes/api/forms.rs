//! Form submission and status API.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use night_market_core::{FormId, FormStatus};

use super::{ApiJson, path_id};
use crate::error::{ApiError, AppError};
use crate::middleware::{RequireAuth, RequireStaff};
use crate::models::Form;
use crate::services::{review, submission};
use crate::state::AppState;

/// Body of `PATCH /api/forms/{id}/status`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateBody {
    pub status: Option<String>,
    /// Absent leaves the notes alone; `null` clears them.
    #[serde(default, deserialize_with = "super::present")]
    pub admin_notes: Option<Option<String>>,
}

/// `POST /api/forms/submit`
#[instrument(skip(user, state, payload), fields(user_id = %user.id))]
pub async fn submit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<Json<Value>, ApiError> {
    let form = submission::submit_form(state.pool(), &user, &payload).await?;
    Ok(Json(json!({ "success": true, "formId": form.id })))
}

/// `PATCH /api/forms/{id}/status`
#[instrument(skip(user, state, body), fields(reviewer_id = %user.id))]
pub async fn update_status(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusUpdateBody>,
) -> Result<Json<Form>, ApiError> {
    let status = parse_status(body.status.as_deref())?;
    let form_id: FormId = path_id(&id, "Form")?;

    let form = review::update_status(
        state.pool(),
        &user,
        form_id,
        status,
        body.admin_notes.as_ref().map(Option::as_deref),
    )
    .await?;
    Ok(Json(form))
}

fn parse_status(raw: Option<&str>) -> Result<FormStatus, AppError> {
    raw.and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid status value".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn body(json: &str) -> StatusUpdateBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_admin_notes_absent_null_and_set() {
        assert_eq!(body(r#"{"status":"approved"}"#).admin_notes, None);
        assert_eq!(
            body(r#"{"status":"approved","adminNotes":null}"#).admin_notes,
            Some(None)
        );
        assert_eq!(
            body(r#"{"status":"approved","adminNotes":""}"#).admin_notes,
            Some(Some(String::new()))
        );
        assert_eq!(
            body(r#"{"status":"conditional","adminNotes":"Bring a fire extinguisher"}"#).admin_notes,
            Some(Some("Bring a fire extinguisher".to_string()))
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(Some("reviewing")).unwrap(), FormStatus::Reviewing);
        for bad in [None, Some(""), Some("APPROVED"), Some("archived")] {
            let err = parse_status(bad).unwrap_err();
            assert_eq!(err.client_message(), "Invalid status value");
        }
    }
}
