//! Shop repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use night_market_core::{ShopId, UserId};

use super::RepositoryError;
use crate::models::Shop;

#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Self {
            id: ShopId::new(row.id),
            user_id: UserId::new(row.user_id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for shop database operations.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the shops owned by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Shop>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShopRow>(
            r"
            SELECT id, user_id, name, description, created_at, updated_at
            FROM shops
            WHERE user_id = $1
            ORDER BY created_at
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Find the user's first shop, or create one.
///
/// Runs on the caller's connection so shop and form creation share a
/// transaction. The user row is locked first, so concurrent first
/// submissions from one vendor cannot create two shops.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn find_or_create_for_user(
    conn: &mut PgConnection,
    user_id: UserId,
    name: &str,
    description: &str,
) -> Result<Shop, RepositoryError> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    let existing = sqlx::query_as::<_, ShopRow>(
        r"
        SELECT id, user_id, name, description, created_at, updated_at
        FROM shops
        WHERE user_id = $1
        ORDER BY created_at
        LIMIT 1
        ",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = existing {
        return Ok(row.into());
    }

    let row = sqlx::query_as::<_, ShopRow>(
        r"
        INSERT INTO shops (user_id, name, description)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, name, description, created_at, updated_at
        ",
    )
    .bind(user_id)
    .bind(name)
    .bind(description)
    .fetch_one(&mut *conn)
    .await?;

    tracing::info!(shop_id = %row.id, user_id = %user_id, "Created shop");
    Ok(row.into())
}
