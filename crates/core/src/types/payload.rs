//! Validation and display of submitted application payloads.
//!
//! Payloads are stored verbatim as JSON. These helpers read them through the
//! field catalogue in [`crate::types::form`].

use serde_json::Value;

use super::form::{Field, FieldKind, FormType};

/// Placeholder shown for missing values.
pub const NOT_SET: &str = "未設定";

/// Reasons a payload is rejected on submission.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Form data must be a JSON object")]
    NotAnObject,
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Email and confirmation email do not match")]
    EmailMismatch,
    #[error("Participation months must be between 1 and 12")]
    InvalidMonths,
}

/// Check a payload against its form type's catalogue.
///
/// General payloads only need to be JSON objects. Known form types must fill
/// every required field, repeat the email address exactly and pick valid
/// months.
///
/// # Errors
///
/// Returns the first [`PayloadError`] found.
pub fn validate(data: &Value) -> Result<FormType, PayloadError> {
    let obj = data.as_object().ok_or(PayloadError::NotAnObject)?;
    let form_type = FormType::from_payload(data);

    let missing: Vec<&'static str> = form_type
        .fields()
        .filter(|f| f.required && !is_filled(f, obj.get(f.key)))
        .map(|f| f.key)
        .collect();
    if !missing.is_empty() {
        return Err(PayloadError::MissingFields(missing));
    }

    if form_type == FormType::General {
        return Ok(form_type);
    }

    if let (Some(email), Some(confirm)) = (obj.get("email"), obj.get("emailConfirm"))
        && email != confirm
    {
        return Err(PayloadError::EmailMismatch);
    }

    match obj.get("participationMonths") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            let valid = items.iter().filter_map(month_number).count();
            if valid != items.len() {
                return Err(PayloadError::InvalidMonths);
            }
        }
        Some(_) => return Err(PayloadError::InvalidMonths),
    }

    Ok(form_type)
}

fn is_filled(field: &Field, value: Option<&Value>) -> bool {
    match (&field.kind, value) {
        (_, None | Some(Value::Null)) => false,
        (FieldKind::Agreement, Some(v)) => is_truthy(v),
        (_, Some(Value::String(s))) => !s.trim().is_empty(),
        (_, Some(Value::Array(items))) => !items.is_empty(),
        (_, Some(_)) => true,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.as_str(), "on" | "true" | "yes" | "1"),
        Value::Number(n) => n.as_i64() != Some(0),
        _ => false,
    }
}

/// Month numbers (1-12) listed in the payload's `participationMonths`.
///
/// Accepts numbers or numeric strings; anything else is dropped. Duplicates
/// are removed and the result is sorted.
#[must_use]
pub fn participation_months(data: &Value) -> Vec<u32> {
    data.get("participationMonths").map_or_else(Vec::new, months_in)
}

fn months_in(value: &Value) -> Vec<u32> {
    let mut months: Vec<u32> = value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(month_number)
        .collect();
    months.sort_unstable();
    months.dedup();
    months
}

fn month_number(value: &Value) -> Option<u32> {
    let month = match value {
        Value::Number(n) => n.as_u64().and_then(|m| u32::try_from(m).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (1..=12).contains(&month).then_some(month)
}

/// First non-empty string among `keys` in the payload.
#[must_use]
pub fn first_text<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| data.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Human-readable rendering of one field's value.
#[must_use]
pub fn display_value(field: &Field, value: Option<&Value>) -> String {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return match field.kind {
            FieldKind::Agreement => "未同意".to_owned(),
            _ => NOT_SET.to_owned(),
        };
    };

    match &field.kind {
        FieldKind::Agreement => {
            if is_truthy(value) {
                "✓ 同意済み".to_owned()
            } else {
                "未同意".to_owned()
            }
        }
        FieldKind::Months => {
            let months = months_in(value);
            if months.is_empty() {
                NOT_SET.to_owned()
            } else {
                months
                    .iter()
                    .map(|m| format!("{m}月"))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
        FieldKind::Select(choices) | FieldKind::Radio(choices) => match value.as_str() {
            Some(s) if !s.is_empty() => choices
                .iter()
                .find(|c| c.value == s)
                .map_or_else(|| s.to_owned(), |c| c.label.to_owned()),
            _ => NOT_SET.to_owned(),
        },
        _ => plain(value),
    }
}

/// Render an arbitrary JSON value for display.
#[must_use]
pub fn plain(value: &Value) -> String {
    match value {
        Value::Null => NOT_SET.to_owned(),
        Value::String(s) if s.trim().is_empty() => NOT_SET.to_owned(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.is_empty() => NOT_SET.to_owned(),
        Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(", "),
        Value::Bool(true) => "はい".to_owned(),
        Value::Bool(false) => "いいえ".to_owned(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn goods_payload() -> Value {
        json!({
            "formType": "goods",
            "brandName": "Hoshi Crafts",
            "contactPerson": "Sato",
            "phone": "090-0000-0000",
            "email": "hoshi@example.com",
            "emailConfirm": "hoshi@example.com",
            "participationMonths": [4, 5],
            "participationPlan": "6months",
            "productType": "Accessories",
            "productFeatures": "Handmade",
            "priceRange": "¥500〜¥3,000",
            "agreementCheck": true,
            "companyName": "Hoshi LLC",
            "representativeName": "Sato Hoshi",
            "companyAddress": "Miyazaki"
        })
    }

    #[test]
    fn test_valid_goods_payload() {
        assert_eq!(validate(&goods_payload()).unwrap(), FormType::Goods);
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(validate(&json!([1, 2])), Err(PayloadError::NotAnObject));
        assert_eq!(validate(&json!("x")), Err(PayloadError::NotAnObject));
    }

    #[test]
    fn test_general_payload_accepts_anything() {
        assert_eq!(
            validate(&json!({"shopName": "Anything"})).unwrap(),
            FormType::General
        );
        assert_eq!(validate(&json!({})).unwrap(), FormType::General);
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let mut data = goods_payload();
        data["brandName"] = json!("  ");
        data.as_object_mut().unwrap().remove("priceRange");
        assert_eq!(
            validate(&data),
            Err(PayloadError::MissingFields(vec!["brandName", "priceRange"]))
        );
    }

    #[test]
    fn test_agreement_must_be_truthy() {
        let mut data = goods_payload();
        data["agreementCheck"] = json!(false);
        assert_eq!(
            validate(&data),
            Err(PayloadError::MissingFields(vec!["agreementCheck"]))
        );
        data["agreementCheck"] = json!("on");
        assert!(validate(&data).is_ok());
    }

    #[test]
    fn test_email_mismatch() {
        let mut data = goods_payload();
        data["emailConfirm"] = json!("other@example.com");
        assert_eq!(validate(&data), Err(PayloadError::EmailMismatch));
    }

    #[test]
    fn test_empty_months_is_missing() {
        let mut data = goods_payload();
        data["participationMonths"] = json!([]);
        assert_eq!(
            validate(&data),
            Err(PayloadError::MissingFields(vec!["participationMonths"]))
        );
    }

    #[test]
    fn test_out_of_range_month_rejected() {
        let mut data = goods_payload();
        data["participationMonths"] = json!([4, 13]);
        assert_eq!(validate(&data), Err(PayloadError::InvalidMonths));
    }

    #[test]
    fn test_participation_months_accepts_strings() {
        let data = json!({"participationMonths": ["7", 3, "x", 7, 0]});
        assert_eq!(participation_months(&data), vec![3, 7]);
        assert!(participation_months(&json!({})).is_empty());
    }

    #[test]
    fn test_first_text() {
        let data = json!({"shopName": "", "brandName": " Kumo ", "contactPerson": "Aoi"});
        assert_eq!(
            first_text(&data, &["shopName", "brandName", "contactPerson"]),
            Some("Kumo")
        );
        assert_eq!(first_text(&data, &["missing"]), None);
    }

    #[test]
    fn test_display_choice_uses_label() {
        let field = FormType::Food
            .fields()
            .find(|f| f.key == "boothType")
            .unwrap();
        assert_eq!(display_value(field, Some(&json!("kitchencar"))), "キッチンカー");
        assert_eq!(display_value(field, Some(&json!("boat"))), "boat");
        assert_eq!(display_value(field, None), NOT_SET);
    }

    #[test]
    fn test_display_months_and_agreement() {
        let months = FormType::Goods
            .fields()
            .find(|f| f.key == "participationMonths")
            .unwrap();
        assert_eq!(display_value(months, Some(&json!([8, 7]))), "7月, 8月");

        let agreement = FormType::Goods
            .fields()
            .find(|f| f.key == "agreementCheck")
            .unwrap();
        assert_eq!(display_value(agreement, Some(&json!(true))), "✓ 同意済み");
        assert_eq!(display_value(agreement, None), "未同意");
    }

    #[test]
    fn test_plain() {
        assert_eq!(plain(&json!(["卵", "乳"])), "卵, 乳");
        assert_eq!(plain(&json!("")), NOT_SET);
        assert_eq!(plain(&json!(42)), "42");
    }
}
