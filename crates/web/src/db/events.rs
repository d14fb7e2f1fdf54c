//! Event repository for database operations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use night_market_core::{EventId, FormId, FormType, UserId};

use super::RepositoryError;
use crate::models::{Event, ScheduledEvent};

const EVENT_COLUMNS: &str = "e.id, e.form_id, e.date, e.start_time, e.end_time, e.created_at, e.updated_at";

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    form_id: Uuid,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::new(row.id),
            form_id: FormId::new(row.form_id),
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OwnedEventRow {
    #[sqlx(flatten)]
    event: EventRow,
    owner_id: Uuid,
}

#[derive(Debug, sqlx::FromRow)]
struct ScheduledEventRow {
    #[sqlx(flatten)]
    event: EventRow,
    shop_name: String,
    form_type: Option<String>,
}

impl From<ScheduledEventRow> for ScheduledEvent {
    fn from(row: ScheduledEventRow) -> Self {
        let form_type = row
            .form_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(FormType::General);

        Self {
            event: row.event.into(),
            shop_name: row.shop_name,
            form_type,
        }
    }
}

/// Repository for event database operations.
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an event for a form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        form_id: FormId,
        date: NaiveDate,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    ) -> Result<Event, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r"
            INSERT INTO events AS e (form_id, date, start_time, end_time)
            VALUES ($1, $2, $3, $4)
            RETURNING {EVENT_COLUMNS}
            "
        ))
        .bind(form_id)
        .bind(date)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get an event together with the ID of the vendor who owns its form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_owner(
        &self,
        id: EventId,
    ) -> Result<Option<(Event, UserId)>, RepositoryError> {
        let row = sqlx::query_as::<_, OwnedEventRow>(&format!(
            r"
            SELECT {EVENT_COLUMNS}, s.user_id AS owner_id
            FROM events e
            JOIN forms f ON f.id = e.form_id
            JOIN shops s ON s.id = f.shop_id
            WHERE e.id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.event.into(), UserId::new(r.owner_id))))
    }

    /// Update the given fields of an event.
    ///
    /// `None` leaves a field untouched; a time of `Some(None)` clears it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the event does not exist.
    pub async fn update(
        &self,
        id: EventId,
        date: Option<NaiveDate>,
        start_time: Option<Option<NaiveTime>>,
        end_time: Option<Option<NaiveTime>>,
    ) -> Result<Event, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r"
            UPDATE events AS e
            SET date = COALESCE($2, e.date),
                start_time = CASE WHEN $3 THEN $4::time ELSE e.start_time END,
                end_time = CASE WHEN $5 THEN $6::time ELSE e.end_time END,
                updated_at = NOW()
            WHERE e.id = $1
            RETURNING {EVENT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(date)
        .bind(start_time.is_some())
        .bind(start_time.flatten())
        .bind(end_time.is_some())
        .bind(end_time.flatten())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete an event. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: EventId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a form's events by date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_form(&self, form_id: FormId) -> Result<Vec<Event>, RepositoryError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r"
            SELECT {EVENT_COLUMNS}
            FROM events e
            WHERE e.form_id = $1
            ORDER BY e.date, e.start_time NULLS FIRST
            "
        ))
        .bind(form_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List every event booked against an approved form, with its shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_scheduled(&self) -> Result<Vec<ScheduledEvent>, RepositoryError> {
        let rows = sqlx::query_as::<_, ScheduledEventRow>(&format!(
            r"
            SELECT {EVENT_COLUMNS},
                   s.name AS shop_name,
                   f.data ->> 'formType' AS form_type
            FROM events e
            JOIN forms f ON f.id = e.form_id
            JOIN shops s ON s.id = f.shop_id
            WHERE f.status = 'approved'
            ORDER BY e.date, e.start_time NULLS FIRST, s.name
            "
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
