//! Application form domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use night_market_core::{Email, FormId, FormStatus, FormType, ShopId, UserId};

/// A submitted application form.
///
/// Serialized as the JSON API's form representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: FormId,
    pub shop_id: ShopId,
    /// The payload exactly as submitted.
    pub data: serde_json::Value,
    pub status: FormStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    #[must_use]
    pub fn form_type(&self) -> FormType {
        FormType::from_payload(&self.data)
    }

    /// Read a string value from the payload.
    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(serde_json::Value::as_str)
    }
}

/// A form joined with its shop and owning account.
///
/// Used by listings and detail pages, which always show who applied.
#[derive(Debug, Clone)]
pub struct FormSummary {
    pub form: Form,
    pub shop_name: String,
    pub owner_id: UserId,
    pub owner_email: Email,
    pub owner_name: Option<String>,
}

impl FormSummary {
    /// Owner name for display, falling back to the email address.
    #[must_use]
    pub fn owner_display(&self) -> &str {
        self.owner_name
            .as_deref()
            .unwrap_or_else(|| self.owner_email.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_form() -> Form {
        Form {
            id: "8a4f5e1c-7d2b-4c3a-9e8f-1a2b3c4d5e6f".parse().unwrap(),
            shop_id: "0b1c2d3e-4f50-4162-8374-95a6b7c8d9e0".parse().unwrap(),
            data: json!({"formType": "food", "shopName": "Yatai Ichiban"}),
            status: FormStatus::Reviewing,
            admin_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(sample_form()).unwrap();
        assert_eq!(value["shopId"], "0b1c2d3e-4f50-4162-8374-95a6b7c8d9e0");
        assert_eq!(value["status"], "reviewing");
        assert!(value["adminNotes"].is_null());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["data"]["shopName"], "Yatai Ichiban");
    }

    #[test]
    fn test_form_type_and_data_str() {
        let form = sample_form();
        assert_eq!(form.form_type(), FormType::Food);
        assert_eq!(form.data_str("shopName"), Some("Yatai Ichiban"));
        assert_eq!(form.data_str("missing"), None);
    }
}
