//! Event (attendance day) domain types.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use night_market_core::{EventId, FormId, FormType};

/// One scheduled attendance day for an approved form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub form_id: FormId,
    pub date: NaiveDate,
    #[serde(serialize_with = "time_of_day::serialize")]
    pub start_time: Option<NaiveTime>,
    #[serde(serialize_with = "time_of_day::serialize")]
    pub end_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// `HH:MM-HH:MM` style time range for display. Empty when no times are set.
    #[must_use]
    pub fn time_range(&self) -> String {
        match (self.start_time, self.end_time) {
            (None, None) => String::new(),
            (start, end) => format!(
                "{}〜{}",
                start.map(time_of_day::format).unwrap_or_default(),
                end.map(time_of_day::format).unwrap_or_default()
            ),
        }
    }
}

/// An event joined with the shop that booked it.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub event: Event,
    pub shop_name: String,
    pub form_type: FormType,
}

/// `HH:MM` wall-clock times as used by the scheduler.
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::Serializer;

    /// Parse `HH:MM` (or `HH:MM:SS`) into a time.
    #[must_use]
    pub fn parse(s: &str) -> Option<NaiveTime> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .ok()
    }

    #[must_use]
    pub fn format(time: NaiveTime) -> String {
        time.format("%H:%M").to_string()
    }

    /// Serialize an optional time as `"HH:MM"` or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)] // serde's serialize_with passes &Option<T>
    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&format(*t)),
            None => s.serialize_none(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn event(start: Option<&str>, end: Option<&str>) -> Event {
        Event {
            id: EventId::generate(),
            form_id: FormId::generate(),
            date: NaiveDate::from_ymd_opt(2026, 7, 18).unwrap(),
            start_time: start.and_then(time_of_day::parse),
            end_time: end.and_then(time_of_day::parse),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            time_of_day::parse("18:30"),
            NaiveTime::from_hms_opt(18, 30, 0)
        );
        assert_eq!(
            time_of_day::parse("09:05:00"),
            NaiveTime::from_hms_opt(9, 5, 0)
        );
        assert_eq!(time_of_day::parse("25:00"), None);
        assert_eq!(time_of_day::parse("evening"), None);
        assert_eq!(time_of_day::parse(""), None);
    }

    #[test]
    fn test_serializes_times_as_hh_mm() {
        let value = serde_json::to_value(event(Some("17:00"), None)).unwrap();
        assert_eq!(value["date"], "2026-07-18");
        assert_eq!(value["startTime"], "17:00");
        assert!(value["endTime"].is_null());
        assert!(value.get("formId").is_some());
    }

    #[test]
    fn test_time_range() {
        assert_eq!(event(Some("17:00"), Some("21:30")).time_range(), "17:00〜21:30");
        assert_eq!(event(Some("17:00"), None).time_range(), "17:00〜");
        assert_eq!(event(None, None).time_range(), "");
    }
}
