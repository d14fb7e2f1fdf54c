//! Conversion of url-encoded application forms into JSON payloads.
//!
//! The HTML forms post flat `key=value` pairs. Payloads are stored as JSON
//! objects shaped like the JSON API's input, so multi-select fields become
//! arrays, month numbers become integers and ticked checkboxes become `true`.

use serde_json::{Map, Value};

use night_market_core::{FieldKind, FormType};

/// Build the JSON payload for `form_type` from submitted pairs.
///
/// `formType` always comes from `form_type`, whatever the body says. Keys
/// outside the catalogue are kept as strings, or arrays when repeated.
#[must_use]
pub fn payload_from_pairs(form_type: FormType, pairs: Vec<(String, String)>) -> Value {
    let mut data = Map::new();

    for (key, raw) in pairs {
        if key == "formType" {
            continue;
        }

        let field = form_type.fields().find(|f| f.key == key);
        let value = match field.map(|f| &f.kind) {
            Some(FieldKind::Months) => month_value(&raw),
            Some(FieldKind::Agreement) => Value::Bool(is_checked(&raw)),
            _ => Value::String(raw),
        };
        let multi = field.is_some_and(|f| f.kind.is_multi());

        match data.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None if multi => {
                data.insert(key, Value::Array(vec![value]));
            }
            None => {
                data.insert(key, value);
            }
        }
    }

    // Unticked checkboxes are absent from the body.
    for field in form_type.fields() {
        if field.kind.is_multi() && !data.contains_key(field.key) {
            data.insert(field.key.to_owned(), Value::Array(Vec::new()));
        }
    }

    data.insert(
        "formType".to_owned(),
        Value::String(form_type.as_str().to_owned()),
    );
    Value::Object(data)
}

fn month_value(raw: &str) -> Value {
    raw.trim()
        .parse::<u64>()
        .map_or_else(|_| Value::String(raw.to_owned()), Value::from)
}

fn is_checked(raw: &str) -> bool {
    matches!(raw, "on" | "true" | "1" | "yes")
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_months_become_integer_array() {
        let data = payload_from_pairs(
            FormType::Goods,
            pairs(&[("participationMonths", "4"), ("participationMonths", "10")]),
        );
        assert_eq!(data["participationMonths"], json!([4, 10]));
    }

    #[test]
    fn test_single_multi_value_is_still_an_array() {
        let data = payload_from_pairs(
            FormType::Food,
            pairs(&[("participationMonths", "7"), ("allergens", "卵")]),
        );
        assert_eq!(data["participationMonths"], json!([7]));
        assert_eq!(data["allergens"], json!(["卵"]));
    }

    #[test]
    fn test_missing_multi_fields_are_empty_arrays() {
        let data = payload_from_pairs(FormType::Food, pairs(&[("shopName", "Yatai")]));
        assert_eq!(data["allergens"], json!([]));
        assert_eq!(data["participationMonths"], json!([]));
    }

    #[test]
    fn test_checkbox_on_becomes_true() {
        let data = payload_from_pairs(FormType::Workshop, pairs(&[("agreementCheck", "on")]));
        assert_eq!(data["agreementCheck"], json!(true));
    }

    #[test]
    fn test_form_type_comes_from_route() {
        let data = payload_from_pairs(
            FormType::Food,
            pairs(&[("formType", "goods"), ("shopName", "Yatai")]),
        );
        assert_eq!(data["formType"], "food");
        assert_eq!(data["shopName"], "Yatai");
    }

    #[test]
    fn test_bad_month_kept_for_validation() {
        let data = payload_from_pairs(FormType::Goods, pairs(&[("participationMonths", "x")]));
        assert_eq!(data["participationMonths"], json!(["x"]));
        assert!(night_market_core::payload::validate(&data).is_err());
    }

    #[test]
    fn test_repeated_unknown_key_becomes_array() {
        let data = payload_from_pairs(
            FormType::Goods,
            pairs(&[("tags", "a"), ("tags", "b"), ("tags", "c")]),
        );
        assert_eq!(data["tags"], json!(["a", "b", "c"]));
    }
}
