//! Event input validation and month grouping.

use chrono::{NaiveDate, NaiveTime, Utc};
use night_market_core::{EventId, FormId};
use night_market_web::models::Event;
use night_market_web::services::schedule::{check_month, parse_times};
use night_market_web::services::{EventInput, ScheduleError, group_by_month};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

fn event(day: &str, start: Option<&str>) -> Event {
    Event {
        id: EventId::generate(),
        form_id: FormId::generate(),
        date: date(day),
        start_time: start.map(|s| NaiveTime::parse_from_str(s, "%H:%M").expect("valid test time")),
        end_time: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn event_input_requires_a_date() {
    assert!(matches!(
        EventInput::parse(None, Some("17:00"), None),
        Err(ScheduleError::MissingFields)
    ));
    assert!(matches!(
        EventInput::parse(Some("  "), None, None),
        Err(ScheduleError::MissingFields)
    ));
}

#[test]
fn event_input_rejects_bad_times() {
    assert!(matches!(
        EventInput::parse(Some("2026-07-18"), Some("5pm"), None),
        Err(ScheduleError::InvalidTime(_))
    ));
    assert!(matches!(
        parse_times(Some("21:00"), Some("17:00")),
        Err(ScheduleError::TimeOrder)
    ));
}

#[test]
fn event_input_accepts_open_ended_times() {
    let input = EventInput::parse(Some("2026-07-18"), Some("17:00"), Some("")).expect("valid input");
    assert_eq!(input.date, date("2026-07-18"));
    assert!(input.start_time.is_some());
    assert!(input.end_time.is_none());
}

#[test]
fn dates_must_fall_in_participation_months() {
    assert!(check_month(date("2026-07-18"), &[7, 8]).is_ok());
    assert!(check_month(date("2026-12-05"), &[]).is_ok());
    assert!(matches!(
        check_month(date("2026-09-01"), &[7, 8]),
        Err(ScheduleError::MonthNotAllowed { month: 9, .. })
    ));
}

#[test]
fn events_group_by_month_in_order() {
    let groups = group_by_month(vec![
        event("2026-08-01", None),
        event("2026-07-25", Some("18:00")),
        event("2027-01-10", None),
        event("2026-07-25", Some("17:00")),
        event("2026-07-04", None),
    ]);

    let labels: Vec<String> = groups.iter().map(night_market_web::services::MonthGroup::label).collect();
    assert_eq!(labels, vec!["2026年7月", "2026年8月", "2027年1月"]);

    let july: Vec<String> = groups
        .first()
        .expect("july group")
        .events
        .iter()
        .map(|e| format!("{} {}", e.date, e.time_range()))
        .collect();
    assert_eq!(
        july,
        vec!["2026-07-04 ", "2026-07-25 17:00〜", "2026-07-25 18:00〜"]
    );
}
