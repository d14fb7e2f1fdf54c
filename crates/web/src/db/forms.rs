//! Form repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use night_market_core::{Email, FormId, FormStatus, FormType, ShopId, UserId};

use super::RepositoryError;
use crate::models::{Form, FormSummary};

// =============================================================================
// Internal Row Types
// =============================================================================

const FORM_COLUMNS: &str = "f.id, f.shop_id, f.data, f.status, f.admin_notes, f.created_at, f.updated_at";

const SUMMARY_FROM: &str = r"
    FROM forms f
    JOIN shops s ON s.id = f.shop_id
    JOIN users u ON u.id = s.user_id
";

#[derive(Debug, sqlx::FromRow)]
struct FormRow {
    id: Uuid,
    shop_id: Uuid,
    data: serde_json::Value,
    status: FormStatus,
    admin_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FormRow> for Form {
    fn from(row: FormRow) -> Self {
        Self {
            id: FormId::new(row.id),
            shop_id: ShopId::new(row.shop_id),
            data: row.data,
            status: row.status,
            admin_notes: row.admin_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FormSummaryRow {
    #[sqlx(flatten)]
    form: FormRow,
    shop_name: String,
    owner_id: Uuid,
    owner_email: String,
    owner_name: Option<String>,
}

impl TryFrom<FormSummaryRow> for FormSummary {
    type Error = RepositoryError;

    fn try_from(row: FormSummaryRow) -> Result<Self, Self::Error> {
        let owner_email = Email::parse(&row.owner_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            form: row.form.into(),
            shop_name: row.shop_name,
            owner_id: UserId::new(row.owner_id),
            owner_email,
            owner_name: row.owner_name,
        })
    }
}

fn summary_select() -> String {
    format!(
        "SELECT {FORM_COLUMNS}, s.name AS shop_name, u.id AS owner_id, \
         u.email AS owner_email, u.name AS owner_name {SUMMARY_FROM}"
    )
}

// =============================================================================
// Filters
// =============================================================================

/// Filters for the applications list.
///
/// Every field is optional; unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    /// Case-insensitive substring of shop name, owner name, owner email or form ID.
    pub search: Option<String>,
    pub status: Option<FormStatus>,
    pub form_type: Option<FormType>,
    /// Earliest submission date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest submission date, inclusive of the whole day.
    pub date_to: Option<NaiveDate>,
}

impl ApplicationFilter {
    /// `ILIKE` pattern for the search term, with wildcards escaped.
    fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{escaped}%"))
    }
}

/// Number of forms in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: i64,
    pub reviewing: i64,
    pub conditional: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl StatusCounts {
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.pending + self.reviewing + self.conditional + self.approved + self.rejected
    }

    #[must_use]
    pub const fn get(&self, status: FormStatus) -> i64 {
        match status {
            FormStatus::Pending => self.pending,
            FormStatus::Reviewing => self.reviewing,
            FormStatus::Conditional => self.conditional,
            FormStatus::Approved => self.approved,
            FormStatus::Rejected => self.rejected,
        }
    }

    fn add(&mut self, status: FormStatus, count: i64) {
        match status {
            FormStatus::Pending => self.pending += count,
            FormStatus::Reviewing => self.reviewing += count,
            FormStatus::Conditional => self.conditional += count,
            FormStatus::Approved => self.approved += count,
            FormStatus::Rejected => self.rejected += count,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for form database operations.
pub struct FormRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FormRepository<'a> {
    /// Create a new form repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a form by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: FormId) -> Result<Option<Form>, RepositoryError> {
        let row = sqlx::query_as::<_, FormRow>(&format!(
            "SELECT {FORM_COLUMNS} FROM forms f WHERE f.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a form with its shop and owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_summary(&self, id: FormId) -> Result<Option<FormSummary>, RepositoryError> {
        let row = sqlx::query_as::<_, FormSummaryRow>(&format!(
            "{} WHERE f.id = $1",
            summary_select()
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List the forms submitted by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<FormSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, FormSummaryRow>(&format!(
            "{} WHERE u.id = $1 ORDER BY f.created_at DESC",
            summary_select()
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List forms with their owners, newest first, narrowed by `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_owner(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<FormSummary>, RepositoryError> {
        let sql = format!(
            r"
            {}
            WHERE ($1::text IS NULL
                   OR s.name ILIKE $1
                   OR u.name ILIKE $1
                   OR u.email ILIKE $1
                   OR f.id::text ILIKE $1)
              AND ($2::form_status IS NULL OR f.status = $2)
              AND ($3::text IS NULL OR
                   CASE WHEN f.data ->> 'formType' IN ('food', 'goods', 'workshop')
                        THEN f.data ->> 'formType'
                        ELSE 'general'
                   END = $3)
              AND ($4::date IS NULL OR f.created_at >= $4::date)
              AND ($5::date IS NULL OR f.created_at < $5::date + 1)
            ORDER BY f.created_at DESC
            ",
            summary_select()
        );

        let rows = sqlx::query_as::<_, FormSummaryRow>(&sql)
            .bind(filter.search_pattern())
            .bind(filter.status)
            .bind(filter.form_type.map(FormType::as_str))
            .bind(filter.date_from)
            .bind(filter.date_to)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Set a form's status and, when given, its admin notes.
    ///
    /// `admin_notes` of `None` leaves the notes untouched; `Some(None)` clears
    /// them. Returns `None` if the form does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        id: FormId,
        status: FormStatus,
        admin_notes: Option<Option<&str>>,
    ) -> Result<Option<Form>, RepositoryError> {
        let row = sqlx::query_as::<_, FormRow>(&format!(
            r"
            UPDATE forms AS f
            SET status = $2,
                admin_notes = CASE WHEN $3 THEN $4 ELSE f.admin_notes END,
                updated_at = NOW()
            WHERE f.id = $1
            RETURNING {FORM_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .bind(admin_notes.is_some())
        .bind(admin_notes.flatten())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Set the status of every listed form.
    ///
    /// Unknown IDs are skipped. Returns the number of forms updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn bulk_update_status(
        &self,
        ids: &[FormId],
        status: FormStatus,
    ) -> Result<u64, RepositoryError> {
        let ids: Vec<Uuid> = ids.iter().map(FormId::as_uuid).collect();
        let result = sqlx::query(
            r"
            UPDATE forms
            SET status = $2, updated_at = NOW()
            WHERE id = ANY($1)
            ",
        )
        .bind(&ids)
        .bind(status)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Count forms per status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_counts(&self) -> Result<StatusCounts, RepositoryError> {
        let rows = sqlx::query_as::<_, (FormStatus, i64)>(
            "SELECT status, COUNT(*) FROM forms GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            counts.add(status, count);
        }
        Ok(counts)
    }
}

/// Insert a new pending form on the caller's connection.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert(
    conn: &mut PgConnection,
    shop_id: ShopId,
    data: &serde_json::Value,
) -> Result<Form, RepositoryError> {
    let row = sqlx::query_as::<_, FormRow>(&format!(
        r"
        INSERT INTO forms AS f (shop_id, data, status)
        VALUES ($1, $2, 'pending')
        RETURNING {FORM_COLUMNS}
        "
    ))
    .bind(shop_id)
    .bind(data)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let filter = ApplicationFilter {
            search: Some(" 100%_yatai ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter.search_pattern().as_deref(),
            Some("%100\\%\\_yatai%")
        );
    }

    #[test]
    fn test_blank_search_is_no_filter() {
        let filter = ApplicationFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.search_pattern(), None);
        assert_eq!(ApplicationFilter::default().search_pattern(), None);
    }

    #[test]
    fn test_status_counts_total() {
        let mut counts = StatusCounts::default();
        counts.add(FormStatus::Pending, 3);
        counts.add(FormStatus::Approved, 2);
        counts.add(FormStatus::Rejected, 1);
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.get(FormStatus::Approved), 2);
        assert_eq!(counts.get(FormStatus::Reviewing), 0);
    }
}
