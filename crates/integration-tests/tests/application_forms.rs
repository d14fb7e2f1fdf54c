//! Application payloads across the core catalogue and the portal's form handling.

use night_market_core::payload::{self, PayloadError};
use night_market_core::{FormType, required_fields};
use night_market_integration_tests::goods_payload;
use night_market_web::services::form_input::payload_from_pairs;
use night_market_web::services::submission::{shop_description_for, shop_name_for};
use serde_json::{Value, json};

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn workshop_pairs() -> Vec<(String, String)> {
    pairs(&[
        ("brandName", "ろうそく工房"),
        ("contactPerson", "佐藤 一郎"),
        ("phone", "090-0000-0000"),
        ("email", "candle@example.jp"),
        ("emailConfirm", "candle@example.jp"),
        ("participationMonths", "7"),
        ("participationMonths", "9"),
        ("participationPlan", "1month"),
        ("activityContent", "キャンドル作り体験"),
        ("durationAndAge", "30分・5歳以上"),
        ("participationFee", "¥1,000"),
        ("materialsTools", "ワックス、芯"),
        ("boothSpace", "3m×3m"),
        ("agreementCheck", "on"),
        ("companyName", "ろうそく工房"),
        ("representativeName", "佐藤 一郎"),
        ("companyAddress", "宮崎県宮崎市"),
    ])
}

#[test]
fn html_workshop_form_produces_a_valid_payload() {
    let data = payload_from_pairs(FormType::Workshop, workshop_pairs());

    assert_eq!(payload::validate(&data), Ok(FormType::Workshop));
    assert_eq!(data["formType"], "workshop");
    assert_eq!(data["participationMonths"], json!([7, 9]));
    assert_eq!(data["agreementCheck"], Value::Bool(true));
    assert_eq!(payload::participation_months(&data), vec![7, 9]);
    assert_eq!(shop_name_for(&data), "ろうそく工房");
}

#[test]
fn html_form_without_months_is_rejected() {
    let mut submitted = workshop_pairs();
    submitted.retain(|(k, _)| k != "participationMonths");
    let data = payload_from_pairs(FormType::Workshop, submitted);

    match payload::validate(&data) {
        Err(PayloadError::MissingFields(fields)) => {
            assert_eq!(fields, vec!["participationMonths"]);
        }
        other => panic!("expected missing months, got {other:?}"),
    }
}

#[test]
fn api_payload_missing_every_required_field_lists_them_all() {
    let data = json!({ "formType": "food" });
    match payload::validate(&data) {
        Err(PayloadError::MissingFields(fields)) => {
            assert_eq!(fields, required_fields(FormType::Food));
        }
        other => panic!("expected missing fields, got {other:?}"),
    }
}

#[test]
fn goods_payload_is_valid_and_names_the_shop() {
    let data = goods_payload("vendor@example.jp");
    assert_eq!(payload::validate(&data), Ok(FormType::Goods));
    assert_eq!(shop_name_for(&data), "星空クラフト");
    assert_eq!(shop_description_for(&data), "天然石を使ったアクセサリー");
}

#[test]
fn mismatched_confirmation_email_is_rejected() {
    let mut data = goods_payload("vendor@example.jp");
    data["emailConfirm"] = json!("other@example.jp");
    assert_eq!(payload::validate(&data), Err(PayloadError::EmailMismatch));
}

#[test]
fn general_payloads_are_accepted_as_is() {
    let data = json!({ "note": "anything" });
    assert_eq!(payload::validate(&data), Ok(FormType::General));
    assert_eq!(shop_name_for(&data), payload::NOT_SET);
    assert_eq!(shop_description_for(&data), "");
}

#[test]
fn non_object_payloads_are_rejected() {
    assert_eq!(
        payload::validate(&json!(["formType", "food"])),
        Err(PayloadError::NotAnObject)
    );
}
