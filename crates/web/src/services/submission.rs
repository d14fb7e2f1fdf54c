//! Vendor form submission.

use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;

use night_market_core::payload::{self, NOT_SET};
use night_market_core::{FormType, PayloadError};

use crate::db::{RepositoryError, forms, shops};
use crate::error::AppError;
use crate::models::{CurrentUser, Form};

/// Payload keys tried, in order, for a new shop's name.
const SHOP_NAME_KEYS: &[&str] = &["shopName", "brandName", "contactPerson"];

/// Payload keys tried, in order, for a new shop's description.
const SHOP_DESCRIPTION_KEYS: &[&str] = &["salesDescription", "productFeatures", "menuItems"];

/// Errors from form submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] PayloadError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(e) => Self::BadRequest(e.to_string()),
            SubmitError::Repository(e) => Self::Database(e),
        }
    }
}

/// Shop name to use when a submission creates the vendor's shop.
#[must_use]
pub fn shop_name_for(data: &Value) -> &str {
    payload::first_text(data, SHOP_NAME_KEYS).unwrap_or(NOT_SET)
}

/// Shop description to use when a submission creates the vendor's shop.
#[must_use]
pub fn shop_description_for(data: &Value) -> &str {
    payload::first_text(data, SHOP_DESCRIPTION_KEYS).unwrap_or_default()
}

/// Validate and store a submitted application.
///
/// The vendor's shop is created on their first submission and reused after
/// that. Shop and form are written in one transaction.
///
/// # Errors
///
/// Returns `SubmitError::Invalid` if the payload fails validation.
/// Returns `SubmitError::Repository` if a database operation fails.
pub async fn submit_form(
    pool: &PgPool,
    user: &CurrentUser,
    data: &Value,
) -> Result<Form, SubmitError> {
    let form_type: FormType = payload::validate(data)?;

    let mut tx = pool.begin().await.map_err(RepositoryError::from)?;

    let shop = shops::find_or_create_for_user(
        &mut tx,
        user.id,
        shop_name_for(data),
        shop_description_for(data),
    )
    .await?;
    let form = forms::insert(&mut tx, shop.id, data).await?;

    tx.commit().await.map_err(RepositoryError::from)?;

    tracing::info!(
        form_id = %form.id,
        shop_id = %shop.id,
        form_type = %form_type,
        "Form submitted"
    );
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shop_name_fallbacks() {
        assert_eq!(shop_name_for(&json!({"shopName": "Yatai"})), "Yatai");
        assert_eq!(
            shop_name_for(&json!({"shopName": "", "brandName": "Hoshi Crafts"})),
            "Hoshi Crafts"
        );
        assert_eq!(shop_name_for(&json!({"contactPerson": "Sato"})), "Sato");
        assert_eq!(shop_name_for(&json!({"remarks": "none"})), "未設定");
    }

    #[test]
    fn test_shop_description_fallbacks() {
        assert_eq!(
            shop_description_for(&json!({"productFeatures": "Handmade", "menuItems": "Yakisoba"})),
            "Handmade"
        );
        assert_eq!(shop_description_for(&json!({"menuItems": "Yakisoba"})), "Yakisoba");
        assert_eq!(shop_description_for(&json!({})), "");
    }

    #[test]
    fn test_invalid_payload_is_bad_request() {
        let err: AppError = SubmitError::Invalid(PayloadError::NotAnObject).into();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "Form data must be a JSON object");
    }
}
