//! Application review: status changes by staff and admins.
//!
//! Any of the five statuses may follow any other. Only the value itself is
//! checked, when it is parsed into [`FormStatus`].

use sqlx::PgPool;
use thiserror::Error;

use night_market_core::{BulkAction, FormId, FormStatus};

use crate::db::{FormRepository, RepositoryError};
use crate::error::AppError;
use crate::models::{CurrentUser, Form};

/// Errors from review operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Form not found")]
    FormNotFound,

    #[error("Invalid ids array")]
    EmptySelection,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::FormNotFound => Self::NotFound(err.to_string()),
            ReviewError::EmptySelection => Self::BadRequest(err.to_string()),
            ReviewError::Repository(e) => Self::Database(e),
        }
    }
}

/// Set a form's status.
///
/// `admin_notes` of `None` leaves the notes as they are; `Some(None)` clears
/// them and `Some(Some(text))` stores `text` as given, even when empty.
///
/// # Errors
///
/// Returns `ReviewError::FormNotFound` if the form does not exist.
pub async fn update_status(
    pool: &PgPool,
    reviewer: &CurrentUser,
    form_id: FormId,
    status: FormStatus,
    admin_notes: Option<Option<&str>>,
) -> Result<Form, ReviewError> {
    let form = FormRepository::new(pool)
        .update_status(form_id, status, admin_notes)
        .await?
        .ok_or(ReviewError::FormNotFound)?;

    tracing::info!(
        form_id = %form_id,
        status = %status,
        reviewer_id = %reviewer.id,
        notes_changed = admin_notes.is_some(),
        "Form status updated"
    );
    Ok(form)
}

/// Approve or reject many forms at once.
///
/// Unknown IDs are skipped. Returns the number of forms actually updated and
/// the status they were set to.
///
/// # Errors
///
/// Returns `ReviewError::EmptySelection` if `ids` is empty.
pub async fn bulk_update(
    pool: &PgPool,
    reviewer: &CurrentUser,
    ids: &[FormId],
    action: BulkAction,
) -> Result<(u64, FormStatus), ReviewError> {
    if ids.is_empty() {
        return Err(ReviewError::EmptySelection);
    }

    let status = action.target_status();
    let count = FormRepository::new(pool)
        .bulk_update_status(ids, status)
        .await?;

    tracing::info!(
        requested = ids.len(),
        updated = count,
        status = %status,
        reviewer_id = %reviewer.id,
        "Bulk status update"
    );
    Ok((count, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_error_statuses() {
        let not_found: AppError = ReviewError::FormNotFound.into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.client_message(), "Form not found");

        let empty: AppError = ReviewError::EmptySelection.into();
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    }
}
