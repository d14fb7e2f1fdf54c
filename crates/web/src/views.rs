//! View models shared by page templates.
//!
//! Templates receive plain strings and flags; formatting happens here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde_json::Value;

use night_market_core::payload::{self, display_value};
use night_market_core::{Choice, Field, FieldKind, FormType, PayloadError, Role};

use crate::models::{CurrentUser, Event, Form, FormSummary, ScheduledEvent, User, VendorSummary};
use crate::services::MonthGroup;

/// Japan Standard Time offset. Dates shown to users are JST calendar dates.
const JST_OFFSET_HOURS: i64 = 9;

fn to_jst(timestamp: DateTime<Utc>) -> NaiveDateTime {
    timestamp.naive_utc() + TimeDelta::hours(JST_OFFSET_HOURS)
}

/// JST calendar date of a timestamp.
#[must_use]
pub fn jst_date(timestamp: DateTime<Utc>) -> NaiveDate {
    to_jst(timestamp).date()
}

/// `2026年7月18日`
#[must_use]
pub fn ja_date(date: NaiveDate) -> String {
    date.format("%Y年%-m月%-d日").to_string()
}

/// `2026/07/18 19:05` in JST.
#[must_use]
pub fn ja_datetime(timestamp: DateTime<Utc>) -> String {
    to_jst(timestamp).format("%Y/%m/%d %H:%M").to_string()
}

/// `2026年7月18日(土)`
#[must_use]
pub fn ja_date_weekday(date: NaiveDate) -> String {
    const WEEKDAYS: [&str; 7] = ["月", "火", "水", "木", "金", "土", "日"];
    let weekday = WEEKDAYS
        .get(chrono::Datelike::weekday(&date).num_days_from_monday() as usize)
        .copied()
        .unwrap_or_default();
    format!("{}({weekday})", ja_date(date))
}

/// First eight characters of an ID.
#[must_use]
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

// =============================================================================
// Layout
// =============================================================================

/// A sidebar entry.
#[derive(Debug, Clone)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Header and sidebar data for the signed-in layout.
#[derive(Debug, Clone)]
pub struct Nav {
    pub event_name: String,
    pub user_name: String,
    pub role_label: &'static str,
    /// CSS modifier for the role's colour scheme.
    pub role_class: &'static str,
    pub links: Vec<NavLink>,
}

impl Nav {
    /// Build the layout for `user` with the link matching `current_path` highlighted.
    #[must_use]
    pub fn new(event_name: &str, user: &CurrentUser, current_path: &str) -> Self {
        let links = sidebar_links(user.role)
            .iter()
            .map(|&(href, label)| NavLink {
                href,
                label,
                active: is_active(href, current_path),
            })
            .collect();

        Self {
            event_name: event_name.to_owned(),
            user_name: user.display_name().to_owned(),
            role_label: user.role.label(),
            role_class: user.role.portal(),
            links,
        }
    }
}

fn is_active(href: &str, current_path: &str) -> bool {
    let dashboard_root = href.matches('/').count() <= 2;
    if dashboard_root {
        current_path == href
    } else {
        current_path == href || current_path.starts_with(&format!("{href}/"))
    }
}

const fn sidebar_links(role: Role) -> &'static [(&'static str, &'static str)] {
    match role {
        Role::User => &[
            ("/dashboard/user", "ダッシュボード"),
            ("/dashboard/user/food", "飲食出店申込"),
            ("/dashboard/user/goods", "物販出店申込"),
            ("/dashboard/user/workshop", "ワークショップ申込"),
        ],
        Role::Staff => &[
            ("/dashboard/staff", "ダッシュボード"),
            ("/dashboard/staff/submissions", "申込一覧"),
            ("/dashboard/staff/vendors", "出店者一覧"),
        ],
        Role::Admin => &[
            ("/dashboard/admin", "ダッシュボード"),
            ("/dashboard/admin/applications", "申込管理"),
            ("/dashboard/admin/vendors", "出店者管理"),
            ("/dashboard/admin/events", "出店スケジュール"),
            ("/dashboard/admin/reports", "レポート"),
            ("/dashboard/admin/security", "アカウント管理"),
        ],
    }
}

// =============================================================================
// Forms
// =============================================================================

/// One row of an applications table.
#[derive(Debug, Clone)]
pub struct FormRowView {
    pub id: String,
    pub short_id: String,
    pub shop_name: String,
    pub owner_name: String,
    pub owner_email: String,
    pub type_label: &'static str,
    pub status: &'static str,
    pub status_label: &'static str,
    pub vendor_status_label: &'static str,
    pub badge_class: &'static str,
    pub submitted_on: String,
}

impl From<&FormSummary> for FormRowView {
    fn from(summary: &FormSummary) -> Self {
        let form = &summary.form;
        let id = form.id.to_string();
        Self {
            short_id: short_id(&id),
            id,
            shop_name: summary.shop_name.clone(),
            owner_name: summary.owner_display().to_owned(),
            owner_email: summary.owner_email.to_string(),
            type_label: form.form_type().label(),
            status: form.status.as_str(),
            status_label: form.status.label(),
            vendor_status_label: form.status.vendor_label(),
            badge_class: form.status.badge_class(),
            submitted_on: ja_date(jst_date(form.created_at)),
        }
    }
}

/// A labelled value in a detail view.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub label: String,
    pub value: String,
    pub long: bool,
}

/// A titled group of values in a detail view.
#[derive(Debug, Clone)]
pub struct SectionView {
    pub title: String,
    pub fields: Vec<FieldView>,
}

/// Render a payload section by section using its form type's catalogue.
///
/// General payloads have no catalogue, so every key is listed as given.
#[must_use]
pub fn form_sections(data: &Value) -> Vec<SectionView> {
    let form_type = FormType::from_payload(data);

    if form_type == FormType::General {
        let fields = data
            .as_object()
            .into_iter()
            .flatten()
            .filter(|(key, _)| key.as_str() != "formType")
            .map(|(key, value)| FieldView {
                label: key.clone(),
                value: payload::plain(value),
                long: false,
            })
            .collect();
        return vec![SectionView {
            title: "申込内容".to_owned(),
            fields,
        }];
    }

    form_type
        .sections()
        .iter()
        .map(|section| SectionView {
            title: section.title.to_owned(),
            fields: section
                .fields
                .iter()
                .filter(|f| !matches!(f.kind, FieldKind::EmailConfirm))
                .map(|f| FieldView {
                    label: f.label.to_owned(),
                    value: display_value(f, data.get(f.key)),
                    long: matches!(f.kind, FieldKind::LongText),
                })
                .collect(),
        })
        .collect()
}

/// Header data of a form detail page.
#[derive(Debug, Clone)]
pub struct FormDetailView {
    pub id: String,
    pub type_label: &'static str,
    pub form_title: &'static str,
    pub status: &'static str,
    pub status_label: &'static str,
    pub vendor_status_label: &'static str,
    pub badge_class: &'static str,
    pub admin_notes: String,
    pub submitted_at: String,
    pub updated_at: String,
    pub sections: Vec<SectionView>,
}

impl From<&Form> for FormDetailView {
    fn from(form: &Form) -> Self {
        let form_type = form.form_type();
        Self {
            id: form.id.to_string(),
            type_label: form_type.label(),
            form_title: form_type.form_title(),
            status: form.status.as_str(),
            status_label: form.status.label(),
            vendor_status_label: form.status.vendor_label(),
            badge_class: form.status.badge_class(),
            admin_notes: form.admin_notes.clone().unwrap_or_default(),
            submitted_at: ja_datetime(form.created_at),
            updated_at: ja_datetime(form.updated_at),
            sections: form_sections(&form.data),
        }
    }
}

/// A status choice in the status updater.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Every status, with `current` selected.
#[must_use]
pub fn status_options(current: Option<night_market_core::FormStatus>) -> Vec<StatusOption> {
    night_market_core::FormStatus::ALL
        .into_iter()
        .map(|s| StatusOption {
            value: s.as_str(),
            label: s.label(),
            selected: Some(s) == current,
        })
        .collect()
}

// =============================================================================
// Input forms
// =============================================================================

/// One selectable value of an input field.
#[derive(Debug, Clone)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
    pub checked: bool,
}

/// One input of an application form, prefilled from `values`.
#[derive(Debug, Clone)]
pub struct InputFieldView {
    pub key: &'static str,
    pub label: &'static str,
    /// `text`, `tel`, `email`, `textarea`, `select`, `radio`, `checkboxes`,
    /// `file` or `agreement`.
    pub input: &'static str,
    pub required: bool,
    pub placeholder: &'static str,
    pub value: String,
    pub choices: Vec<ChoiceView>,
}

/// A titled group of inputs.
#[derive(Debug, Clone)]
pub struct InputSectionView {
    pub title: &'static str,
    pub fields: Vec<InputFieldView>,
}

/// Inputs of `form_type`'s application form, filled with any previous
/// submission in `values`.
#[must_use]
pub fn input_sections(form_type: FormType, values: &Value) -> Vec<InputSectionView> {
    form_type
        .sections()
        .iter()
        .map(|section| InputSectionView {
            title: section.title,
            fields: section.fields.iter().map(|f| input_field(f, values.get(f.key))).collect(),
        })
        .collect()
}

fn input_field(field: &Field, value: Option<&Value>) -> InputFieldView {
    let text = value.and_then(Value::as_str).unwrap_or_default().to_owned();
    let selected = selected_values(value);

    let (input, choices) = match &field.kind {
        FieldKind::Text => ("text", Vec::new()),
        FieldKind::Tel => ("tel", Vec::new()),
        FieldKind::Email | FieldKind::EmailConfirm => ("email", Vec::new()),
        FieldKind::LongText => ("textarea", Vec::new()),
        FieldKind::File => ("file", Vec::new()),
        FieldKind::Agreement => ("agreement", Vec::new()),
        FieldKind::Select(options) => ("select", choice_views(options, &selected)),
        FieldKind::Radio(options) => ("radio", choice_views(options, &selected)),
        FieldKind::Months => (
            "checkboxes",
            (1..=12)
                .map(|m: u32| {
                    let value = m.to_string();
                    ChoiceView {
                        checked: selected.contains(&value),
                        label: format!("{m}月"),
                        value,
                    }
                })
                .collect(),
        ),
        FieldKind::Checkboxes(options) => (
            "checkboxes",
            options
                .iter()
                .map(|&o| ChoiceView {
                    value: o.to_owned(),
                    label: o.to_owned(),
                    checked: selected.iter().any(|s| s.as_str() == o),
                })
                .collect(),
        ),
    };

    let value = if matches!(field.kind, FieldKind::Agreement) {
        if value.is_some_and(|v| matches!(v, Value::Bool(true))) {
            "checked".to_owned()
        } else {
            String::new()
        }
    } else {
        text
    };

    InputFieldView {
        key: field.key,
        label: field.label,
        input,
        required: field.required,
        placeholder: field.placeholder.unwrap_or_default(),
        value,
        choices,
    }
}

fn selected_values(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(scalar_text).collect(),
        Some(other) => vec![scalar_text(other)],
        None => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn choice_views(options: &[Choice], selected: &[String]) -> Vec<ChoiceView> {
    options
        .iter()
        .map(|c| ChoiceView {
            value: c.value.to_owned(),
            label: c.label.to_owned(),
            checked: selected.iter().any(|s| s.as_str() == c.value),
        })
        .collect()
}

/// Message shown above a rejected application form.
#[must_use]
pub fn payload_error_message(form_type: FormType, err: &PayloadError) -> String {
    match err {
        PayloadError::NotAnObject => "申込内容を読み取れませんでした".to_owned(),
        PayloadError::MissingFields(keys) => {
            let labels: Vec<&str> = keys
                .iter()
                .map(|key| {
                    form_type
                        .fields()
                        .find(|f| f.key == *key)
                        .map_or(*key, |f| f.label)
                })
                .collect();
            format!("必須項目が入力されていません: {}", labels.join("、"))
        }
        PayloadError::EmailMismatch => {
            "メールアドレスと確認用メールアドレスが一致しません".to_owned()
        }
        PayloadError::InvalidMonths => "出店希望月は1月〜12月から選択してください".to_owned(),
    }
}

// =============================================================================
// Events
// =============================================================================

/// One row of a schedule.
#[derive(Debug, Clone)]
pub struct EventRowView {
    pub id: String,
    pub form_id: String,
    pub date_label: String,
    pub time_range: String,
    pub shop_name: String,
    pub type_label: &'static str,
}

impl From<&Event> for EventRowView {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_string(),
            form_id: event.form_id.to_string(),
            date_label: ja_date_weekday(event.date),
            time_range: event.time_range(),
            shop_name: String::new(),
            type_label: "",
        }
    }
}

impl From<&ScheduledEvent> for EventRowView {
    fn from(scheduled: &ScheduledEvent) -> Self {
        Self {
            shop_name: scheduled.shop_name.clone(),
            type_label: scheduled.form_type.label(),
            ..Self::from(&scheduled.event)
        }
    }
}

/// Events of one month under a heading.
#[derive(Debug, Clone)]
pub struct MonthView {
    pub label: String,
    pub events: Vec<EventRowView>,
}

/// Render month groups for a schedule.
#[must_use]
pub fn month_views<'a, T>(groups: &'a [MonthGroup<T>]) -> Vec<MonthView>
where
    EventRowView: From<&'a T>,
{
    groups
        .iter()
        .map(|group| MonthView {
            label: group.label(),
            events: group.events.iter().map(EventRowView::from).collect(),
        })
        .collect()
}

// =============================================================================
// Accounts
// =============================================================================

/// One row of the account list.
#[derive(Debug, Clone)]
pub struct UserRowView {
    pub name: String,
    pub email: String,
    pub role_label: &'static str,
    pub role_class: &'static str,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserRowView {
    fn from(user: &User) -> Self {
        Self {
            name: user.display_name().to_owned(),
            email: user.email.to_string(),
            role_label: user.role.label(),
            role_class: user.role.portal(),
            created_at: ja_datetime(user.created_at),
            updated_at: ja_datetime(user.updated_at),
        }
    }
}

/// One row of the vendor list.
#[derive(Debug, Clone)]
pub struct VendorRowView {
    pub name: String,
    pub email: String,
    pub shop_count: i64,
    pub form_count: i64,
    pub registered_on: String,
}

impl From<&VendorSummary> for VendorRowView {
    fn from(vendor: &VendorSummary) -> Self {
        Self {
            name: vendor.user.display_name().to_owned(),
            email: vendor.user.email.to_string(),
            shop_count: vendor.shop_count,
            form_count: vendor.form_count,
            registered_on: ja_date(jst_date(vendor.user.created_at)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use night_market_core::{Email, UserId};
    use serde_json::json;

    #[test]
    fn test_jst_date_crosses_midnight() {
        let late_utc = Utc.with_ymd_and_hms(2026, 7, 18, 16, 30, 0).unwrap();
        assert_eq!(jst_date(late_utc), NaiveDate::from_ymd_opt(2026, 7, 19).unwrap());
        assert_eq!(ja_datetime(late_utc), "2026/07/19 01:30");
    }

    #[test]
    fn test_ja_date_formats() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();
        assert_eq!(ja_date(date), "2026年7月4日");
        assert_eq!(ja_date_weekday(date), "2026年7月4日(土)");
    }

    #[test]
    fn test_nav_highlights_current_section() {
        let user = CurrentUser {
            id: UserId::generate(),
            email: Email::parse("admin@test.com").unwrap(),
            name: Some("Test Admin".to_owned()),
            role: Role::Admin,
        };
        let nav = Nav::new("Night Market Miyazaki", &user, "/dashboard/admin/applications/abc");
        let active: Vec<_> = nav.links.iter().filter(|l| l.active).map(|l| l.href).collect();
        assert_eq!(active, vec!["/dashboard/admin/applications"]);
        assert_eq!(nav.user_name, "Test Admin");
        assert_eq!(nav.role_label, "管理者");
    }

    #[test]
    fn test_dashboard_link_only_active_on_exact_path() {
        assert!(is_active("/dashboard/user", "/dashboard/user"));
        assert!(!is_active("/dashboard/user", "/dashboard/user/food"));
        assert!(is_active("/dashboard/user/food", "/dashboard/user/food"));
    }

    #[test]
    fn test_workshop_sections_use_workshop_keys() {
        let data = json!({
            "formType": "workshop",
            "brandName": "Hoshi Workshop",
            "activityContent": "Candle making",
            "participationFee": "¥500",
            "emailConfirm": "hoshi@example.com",
        });
        let sections = form_sections(&data);
        let values: Vec<_> = sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .map(|f| (f.label.as_str(), f.value.as_str()))
            .collect();

        assert!(values.contains(&("実施内容・体験内容", "Candle making")));
        assert!(values.contains(&("参加費", "¥500")));
        assert!(!values.iter().any(|(label, _)| label.contains("確認用")));
    }

    #[test]
    fn test_general_payload_lists_raw_keys() {
        let sections = form_sections(&json!({"note": "hello", "count": 3}));
        assert_eq!(sections.len(), 1);
        let labels: Vec<_> = sections[0].fields.iter().map(|f| f.label.as_str()).collect();
        assert!(labels.contains(&"note"));
        assert!(labels.contains(&"count"));
    }

    #[test]
    fn test_input_sections_prefill_previous_values() {
        let data = json!({
            "formType": "food",
            "shopName": "Yatai Ichiban",
            "participationMonths": [7, 8],
            "boothType": "kitchencar",
            "allergens": ["卵"],
            "agreementCheck": true,
        });
        let fields: Vec<_> = input_sections(FormType::Food, &data)
            .into_iter()
            .flat_map(|s| s.fields)
            .collect();
        let find = |key: &str| fields.iter().find(|f| f.key == key).unwrap();

        assert_eq!(find("shopName").value, "Yatai Ichiban");
        assert_eq!(find("shopName").input, "text");

        let months: Vec<_> = find("participationMonths")
            .choices
            .iter()
            .filter(|c| c.checked)
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(months, vec!["7", "8"]);

        let booth = find("boothType");
        assert_eq!(booth.input, "select");
        assert!(booth.choices.iter().any(|c| c.value == "kitchencar" && c.checked));

        assert!(find("allergens").choices.iter().any(|c| c.label == "卵" && c.checked));
        assert_eq!(find("agreementCheck").value, "checked");
        assert_eq!(find("remarks").input, "textarea");
    }

    #[test]
    fn test_payload_error_message_uses_labels() {
        let err = PayloadError::MissingFields(vec!["brandName", "participationMonths"]);
        assert_eq!(
            payload_error_message(FormType::Goods, &err),
            "必須項目が入力されていません: 屋号・ブランド名、出店希望月"
        );
    }
}
