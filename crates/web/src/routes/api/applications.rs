//! Admin bulk review API.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use night_market_core::{BulkAction, FormId};

use super::ApiJson;
use crate::error::{ApiError, AppError};
use crate::middleware::RequireAdmin;
use crate::services::{ReviewError, review};
use crate::state::AppState;

/// Body of `POST /api/admin/applications/bulk`.
#[derive(Debug, Default, Deserialize)]
pub struct BulkBody {
    /// Must be a non-empty array of form IDs.
    pub ids: Option<Value>,
    pub action: Option<String>,
}

impl BulkBody {
    /// The selected form IDs. Entries that are not form IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::EmptySelection` unless `ids` is a non-empty array.
    pub fn form_ids(&self) -> Result<Vec<FormId>, ReviewError> {
        match &self.ids {
            Some(Value::Array(items)) if !items.is_empty() => Ok(items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|s| s.parse().ok())
                .collect()),
            _ => Err(ReviewError::EmptySelection),
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` unless the action is `approve` or `reject`.
    pub fn bulk_action(&self) -> Result<BulkAction, AppError> {
        self.action
            .as_deref()
            .and_then(|a| a.parse().ok())
            .ok_or_else(|| {
                AppError::BadRequest("Invalid action. Must be 'approve' or 'reject'".to_string())
            })
    }
}

/// `POST /api/admin/applications/bulk`
#[instrument(skip(admin, state, body), fields(admin_id = %admin.id))]
pub async fn bulk_update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BulkBody>,
) -> Result<Json<Value>, ApiError> {
    let ids = body.form_ids()?;
    let action = body.bulk_action()?;

    let (count, status) = if ids.is_empty() {
        (0, action.target_status())
    } else {
        review::bulk_update(state.pool(), &admin, &ids, action).await?
    };

    Ok(Json(json!({
        "success": true,
        "count": count,
        "status": status,
    })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use night_market_core::FormStatus;

    fn body(value: Value) -> BulkBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_ids_must_be_non_empty_array() {
        for value in [
            json!({"action": "approve"}),
            json!({"ids": [], "action": "approve"}),
            json!({"ids": "8a4f5e1c-7d2b-4c3a-9e8f-1a2b3c4d5e6f", "action": "approve"}),
        ] {
            let err = body(value).form_ids().unwrap_err();
            assert_eq!(err.to_string(), "Invalid ids array");
        }
    }

    #[test]
    fn test_unparseable_ids_are_skipped() {
        let ids = body(json!({
            "ids": ["8a4f5e1c-7d2b-4c3a-9e8f-1a2b3c4d5e6f", "nope", 42],
            "action": "reject",
        }))
        .form_ids()
        .unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_bulk_action() {
        let b = body(json!({"ids": ["x"], "action": "approve"}));
        assert_eq!(b.bulk_action().unwrap().target_status(), FormStatus::Approved);

        for action in [json!("archive"), json!(null), json!("APPROVE")] {
            let err = body(json!({"ids": ["x"], "action": action})).bulk_action().unwrap_err();
            assert_eq!(
                err.client_message(),
                "Invalid action. Must be 'approve' or 'reject'"
            );
        }
    }
}
