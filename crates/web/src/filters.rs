//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// First eight characters of an ID, as shown in tables.
///
/// Usage in templates: `{{ form.id|short_id }}`
#[askama::filter_fn]
pub fn short_id(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(crate::views::short_id(&value.to_string()))
}

/// `YYYY-MM-DD` rendered as `YYYY年M月D日`. Other input passes through.
///
/// Usage in templates: `{{ event.date|ja_date }}`
#[askama::filter_fn]
pub fn ja_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(text
        .get(..10)
        .and_then(|day| chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .map_or(text, crate::views::ja_date))
}
