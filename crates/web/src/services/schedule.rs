//! Event scheduling for approved applications.
//!
//! A vendor books attendance days against their own approved forms. Dates
//! must fall in one of the form's participation months when it lists any.
//! Several events on the same day are allowed.

use chrono::{Datelike, NaiveDate, NaiveTime};
use sqlx::PgPool;
use thiserror::Error;

use night_market_core::payload::participation_months;
use night_market_core::{EventId, FormId, FormStatus};

use crate::db::{EventRepository, FormRepository, RepositoryError};
use crate::error::AppError;
use crate::models::event::time_of_day;
use crate::models::{CurrentUser, Event, ScheduledEvent};

/// Errors from event scheduling.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("formId and date are required")]
    MissingFields,

    #[error("Forbidden")]
    NotOwner,

    #[error("Event not found")]
    EventNotFound,

    #[error("Form must be approved to add events")]
    FormNotApproved,

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid time: {0} (expected HH:MM)")]
    InvalidTime(String),

    #[error("startTime must be before endTime")]
    TimeOrder,

    #[error("Date must fall in a participation month ({})", format_months(.allowed))]
    MonthNotAllowed { month: u32, allowed: Vec<u32> },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn format_months(months: &[u32]) -> String {
    months
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ScheduleError {
    /// Message for the vendor's scheduler page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields => "日付を選択してください".to_owned(),
            Self::NotOwner | Self::EventNotFound => "出店日が見つかりません".to_owned(),
            Self::FormNotApproved => "承認済みの申込のみ出店日を登録できます".to_owned(),
            Self::InvalidDate(_) => "日付の形式が正しくありません".to_owned(),
            Self::InvalidTime(_) => "時間はHH:MM形式で入力してください".to_owned(),
            Self::TimeOrder => "終了時間は開始時間より後にしてください".to_owned(),
            Self::MonthNotAllowed { allowed, .. } => format!(
                "選択した月（{}）の日付のみ登録できます",
                allowed
                    .iter()
                    .map(|m| format!("{m}月"))
                    .collect::<Vec<_>>()
                    .join("、")
            ),
            Self::Repository(_) => "エラーが発生しました".to_owned(),
        }
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::NotOwner => Self::Forbidden(err.to_string()),
            ScheduleError::EventNotFound => Self::NotFound(err.to_string()),
            ScheduleError::Repository(e) => Self::Database(e),
            _ => Self::BadRequest(err.to_string()),
        }
    }
}

// =============================================================================
// Input Parsing
// =============================================================================

/// Validated date and times of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventInput {
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl EventInput {
    /// Parse a date and optional `HH:MM` times. Blank times count as absent.
    ///
    /// # Errors
    ///
    /// Returns a `ScheduleError` describing the first invalid value.
    pub fn parse(
        date: Option<&str>,
        start_time: Option<&str>,
        end_time: Option<&str>,
    ) -> Result<Self, ScheduleError> {
        let date = date
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ScheduleError::MissingFields)
            .and_then(parse_date)?;
        let (start_time, end_time) = parse_times(start_time, end_time)?;

        Ok(Self {
            date,
            start_time,
            end_time,
        })
    }
}

/// Parse a `YYYY-MM-DD` date. A trailing ISO time part is ignored.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidDate` if the date cannot be read.
pub fn parse_date(s: &str) -> Result<NaiveDate, ScheduleError> {
    let s = s.trim();
    let day = s.split_once('T').map_or(s, |(day, _)| day);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| ScheduleError::InvalidDate(s.to_owned()))
}

/// Parse optional start and end times and check their order.
///
/// # Errors
///
/// Returns `ScheduleError::InvalidTime` or `ScheduleError::TimeOrder`.
pub fn parse_times(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<NaiveTime>, Option<NaiveTime>), ScheduleError> {
    let start = parse_time(start)?;
    let end = parse_time(end)?;
    check_order(start, end)?;
    Ok((start, end))
}

fn check_order(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Result<(), ScheduleError> {
    match (start, end) {
        (Some(s), Some(e)) if s >= e => Err(ScheduleError::TimeOrder),
        _ => Ok(()),
    }
}

fn parse_time(value: Option<&str>) -> Result<Option<NaiveTime>, ScheduleError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => time_of_day::parse(s)
            .map(Some)
            .ok_or_else(|| ScheduleError::InvalidTime(s.to_owned())),
    }
}

/// Changes requested for an existing event.
///
/// `None` leaves a value as it is. A time of `Some(None)` clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub date: Option<NaiveDate>,
    pub start_time: Option<Option<NaiveTime>>,
    pub end_time: Option<Option<NaiveTime>>,
}

impl EventChanges {
    /// Parse requested changes. A blank date keeps the current one and a
    /// blank time clears it.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::InvalidDate` or `ScheduleError::InvalidTime`.
    pub fn parse(
        date: Option<&str>,
        start_time: Option<Option<&str>>,
        end_time: Option<Option<&str>>,
    ) -> Result<Self, ScheduleError> {
        Ok(Self {
            date: date
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(parse_date)
                .transpose()?,
            start_time: start_time.map(parse_time).transpose()?,
            end_time: end_time.map(parse_time).transpose()?,
        })
    }

    /// Times `event` would have after these changes.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::TimeOrder` if the resulting start is not
    /// before the resulting end.
    pub fn merged_times(
        &self,
        event: &Event,
    ) -> Result<(Option<NaiveTime>, Option<NaiveTime>), ScheduleError> {
        let start = self.start_time.unwrap_or(event.start_time);
        let end = self.end_time.unwrap_or(event.end_time);
        check_order(start, end)?;
        Ok((start, end))
    }
}

/// Check `date` against the months a form applied for.
///
/// An empty month list allows any date.
///
/// # Errors
///
/// Returns `ScheduleError::MonthNotAllowed` if the month is not listed.
pub fn check_month(date: NaiveDate, allowed: &[u32]) -> Result<(), ScheduleError> {
    if allowed.is_empty() || allowed.contains(&date.month()) {
        Ok(())
    } else {
        Err(ScheduleError::MonthNotAllowed {
            month: date.month(),
            allowed: allowed.to_vec(),
        })
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Book an event against one of the vendor's approved forms.
///
/// A missing form is reported as not owned.
///
/// # Errors
///
/// Returns `ScheduleError::NotOwner` if the form is missing or belongs to
/// someone else, `ScheduleError::FormNotApproved` if it is not approved, or
/// `ScheduleError::MonthNotAllowed` if the date is outside its months.
pub async fn create_event(
    pool: &PgPool,
    user: &CurrentUser,
    form_id: FormId,
    input: EventInput,
) -> Result<Event, ScheduleError> {
    let summary = FormRepository::new(pool)
        .get_summary(form_id)
        .await?
        .filter(|s| s.owner_id == user.id)
        .ok_or(ScheduleError::NotOwner)?;

    if summary.form.status != FormStatus::Approved {
        return Err(ScheduleError::FormNotApproved);
    }
    check_month(input.date, &participation_months(&summary.form.data))?;

    let event = EventRepository::new(pool)
        .create(form_id, input.date, input.start_time, input.end_time)
        .await?;

    tracing::info!(event_id = %event.id, form_id = %form_id, date = %event.date, "Event created");
    Ok(event)
}

/// Apply changes to one of the vendor's events.
///
/// Fields left out of `changes` keep their current values.
///
/// # Errors
///
/// Returns `ScheduleError::EventNotFound` if the event does not exist,
/// `ScheduleError::NotOwner` if it belongs to someone else,
/// `ScheduleError::TimeOrder` if the resulting times are out of order, or
/// `ScheduleError::MonthNotAllowed` if a new date is outside the form's months.
pub async fn update_event(
    pool: &PgPool,
    user: &CurrentUser,
    event_id: EventId,
    changes: EventChanges,
) -> Result<Event, ScheduleError> {
    let events = EventRepository::new(pool);
    let event = owned_event(&events, user, event_id).await?;
    changes.merged_times(&event)?;

    if let Some(date) = changes.date
        && let Some(form) = FormRepository::new(pool).get_by_id(event.form_id).await?
    {
        check_month(date, &participation_months(&form.data))?;
    }

    let event = events
        .update(event_id, changes.date, changes.start_time, changes.end_time)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => ScheduleError::EventNotFound,
            other => other.into(),
        })?;

    tracing::info!(event_id = %event_id, date = %event.date, "Event updated");
    Ok(event)
}

/// Delete one of the vendor's events.
///
/// # Errors
///
/// Returns `ScheduleError::EventNotFound` if the event does not exist or
/// `ScheduleError::NotOwner` if it belongs to someone else.
pub async fn delete_event(
    pool: &PgPool,
    user: &CurrentUser,
    event_id: EventId,
) -> Result<(), ScheduleError> {
    let events = EventRepository::new(pool);
    owned_event(&events, user, event_id).await?;

    if !events.delete(event_id).await? {
        return Err(ScheduleError::EventNotFound);
    }

    tracing::info!(event_id = %event_id, "Event deleted");
    Ok(())
}

async fn owned_event(
    events: &EventRepository<'_>,
    user: &CurrentUser,
    event_id: EventId,
) -> Result<Event, ScheduleError> {
    let (event, owner_id) = events
        .get_with_owner(event_id)
        .await?
        .ok_or(ScheduleError::EventNotFound)?;

    if owner_id != user.id {
        return Err(ScheduleError::NotOwner);
    }
    Ok(event)
}

// =============================================================================
// Grouping
// =============================================================================

/// Something placed on a date, optionally at a time.
pub trait Dated {
    fn date(&self) -> NaiveDate;
    fn start_time(&self) -> Option<NaiveTime>;
}

impl Dated for Event {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn start_time(&self) -> Option<NaiveTime> {
        self.start_time
    }
}

impl Dated for ScheduledEvent {
    fn date(&self) -> NaiveDate {
        self.event.date
    }

    fn start_time(&self) -> Option<NaiveTime> {
        self.event.start_time
    }
}

/// Events falling in one calendar month.
#[derive(Debug, Clone)]
pub struct MonthGroup<T> {
    pub year: i32,
    pub month: u32,
    pub events: Vec<T>,
}

impl<T> MonthGroup<T> {
    /// Heading such as `2026年7月`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}年{}月", self.year, self.month)
    }
}

/// Group events by calendar month, earliest month first.
///
/// Within a month, events are ordered by date and then start time, untimed
/// events first.
#[must_use]
pub fn group_by_month<T: Dated>(mut events: Vec<T>) -> Vec<MonthGroup<T>> {
    events.sort_by_key(|e| (e.date(), e.start_time()));

    let mut groups: Vec<MonthGroup<T>> = Vec::new();
    for event in events {
        let (year, month) = (event.date().year(), event.date().month());
        match groups.last_mut() {
            Some(group) if group.year == year && group.month == month => group.events.push(event),
            _ => groups.push(MonthGroup {
                year,
                month,
                events: vec![event],
            }),
        }
    }
    groups
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Utc;

    fn event(date: &str, start: Option<&str>) -> Event {
        Event {
            id: EventId::generate(),
            form_id: FormId::generate(),
            date: parse_date(date).unwrap(),
            start_time: start.and_then(time_of_day::parse),
            end_time: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_by_month_orders_months_and_days() {
        let groups = group_by_month(vec![
            event("2026-08-02", None),
            event("2026-07-18", Some("19:00")),
            event("2027-01-09", None),
            event("2026-07-18", Some("17:00")),
            event("2026-07-04", None),
        ]);

        let months: Vec<_> = groups.iter().map(|g| (g.year, g.month)).collect();
        assert_eq!(months, vec![(2026, 7), (2026, 8), (2027, 1)]);

        let july: Vec<_> = groups[0]
            .events
            .iter()
            .map(|e| (e.date.day(), e.start_time.map(time_of_day::format)))
            .collect();
        assert_eq!(
            july,
            vec![
                (4, None),
                (18, Some("17:00".to_owned())),
                (18, Some("19:00".to_owned())),
            ]
        );
        assert_eq!(groups[0].label(), "2026年7月");
    }

    #[test]
    fn test_group_by_month_empty() {
        assert!(group_by_month(Vec::<Event>::new()).is_empty());
    }

    #[test]
    fn test_parse_input() {
        let input = EventInput::parse(Some("2026-07-18"), Some("17:00"), Some("")).unwrap();
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2026, 7, 18).unwrap());
        assert_eq!(input.start_time, NaiveTime::from_hms_opt(17, 0, 0));
        assert_eq!(input.end_time, None);
    }

    #[test]
    fn test_parse_input_rejects_bad_values() {
        assert!(matches!(
            EventInput::parse(None, None, None),
            Err(ScheduleError::MissingFields)
        ));
        assert!(matches!(
            EventInput::parse(Some("  "), None, None),
            Err(ScheduleError::MissingFields)
        ));
        assert!(matches!(
            EventInput::parse(Some("18/07/2026"), None, None),
            Err(ScheduleError::InvalidDate(_))
        ));
        assert!(matches!(
            EventInput::parse(Some("2026-07-18"), Some("7pm"), None),
            Err(ScheduleError::InvalidTime(_))
        ));
        assert!(matches!(
            EventInput::parse(Some("2026-07-18"), Some("21:00"), Some("17:00")),
            Err(ScheduleError::TimeOrder)
        ));
        assert!(matches!(
            EventInput::parse(Some("2026-07-18"), Some("17:00"), Some("17:00")),
            Err(ScheduleError::TimeOrder)
        ));
    }

    fn timed_event(start: &str, end: &str) -> Event {
        Event {
            end_time: time_of_day::parse(end),
            ..event("2026-07-18", Some(start))
        }
    }

    #[test]
    fn test_changes_keep_omitted_times() {
        let booked = timed_event("17:00", "21:00");
        let changes = EventChanges::parse(Some("2026-07-25"), None, None).unwrap();

        assert_eq!(changes.date, NaiveDate::from_ymd_opt(2026, 7, 25));
        assert_eq!(
            changes.merged_times(&booked).unwrap(),
            (NaiveTime::from_hms_opt(17, 0, 0), NaiveTime::from_hms_opt(21, 0, 0))
        );
    }

    #[test]
    fn test_changes_null_and_blank_clear_times() {
        let booked = timed_event("17:00", "21:00");
        let changes = EventChanges::parse(None, Some(None), Some(Some(" "))).unwrap();

        assert_eq!(changes.date, None);
        assert_eq!(changes.start_time, Some(None));
        assert_eq!(changes.end_time, Some(None));
        assert_eq!(changes.merged_times(&booked).unwrap(), (None, None));
    }

    #[test]
    fn test_changes_check_order_against_current_times() {
        let booked = timed_event("17:00", "21:00");

        let late_start = EventChanges::parse(None, Some(Some("22:00")), None).unwrap();
        assert!(matches!(
            late_start.merged_times(&booked),
            Err(ScheduleError::TimeOrder)
        ));

        let early_end = EventChanges::parse(None, None, Some(Some("16:30"))).unwrap();
        assert!(matches!(
            early_end.merged_times(&booked),
            Err(ScheduleError::TimeOrder)
        ));

        let later_end = EventChanges::parse(None, None, Some(Some("22:30"))).unwrap();
        assert_eq!(
            later_end.merged_times(&booked).unwrap(),
            (NaiveTime::from_hms_opt(17, 0, 0), NaiveTime::from_hms_opt(22, 30, 0))
        );
    }

    #[test]
    fn test_changes_reject_bad_values() {
        assert!(matches!(
            EventChanges::parse(Some("July 25"), None, None),
            Err(ScheduleError::InvalidDate(_))
        ));
        assert!(matches!(
            EventChanges::parse(None, Some(Some("25:00")), None),
            Err(ScheduleError::InvalidTime(_))
        ));
        assert_eq!(
            EventChanges::parse(Some(""), None, None).unwrap(),
            EventChanges::default()
        );
    }

    #[test]
    fn test_parse_date_accepts_iso_timestamp() {
        assert_eq!(
            parse_date("2026-07-18T00:00:00.000Z").unwrap(),
            NaiveDate::from_ymd_opt(2026, 7, 18).unwrap()
        );
    }

    #[test]
    fn test_check_month() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 18).unwrap();
        assert!(check_month(date, &[]).is_ok());
        assert!(check_month(date, &[6, 7]).is_ok());

        let err = check_month(date, &[4, 5]).unwrap_err();
        assert!(matches!(err, ScheduleError::MonthNotAllowed { month: 7, .. }));
        assert_eq!(err.user_message(), "選択した月（4月、5月）の日付のみ登録できます");
    }

    #[test]
    fn test_error_statuses() {
        let status = |e: ScheduleError| AppError::from(e).status();
        assert_eq!(status(ScheduleError::NotOwner), StatusCode::FORBIDDEN);
        assert_eq!(status(ScheduleError::EventNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(ScheduleError::FormNotApproved), StatusCode::BAD_REQUEST);
        assert_eq!(status(ScheduleError::MissingFields), StatusCode::BAD_REQUEST);
        assert_eq!(status(ScheduleError::TimeOrder), StatusCode::BAD_REQUEST);
    }
}
