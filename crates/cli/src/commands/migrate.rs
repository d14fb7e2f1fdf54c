//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! nm-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `NM_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Portal schema: `crates/web/migrations/`. The session table is created by
//! the session store's own migration.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CliError, connect};

/// Run the portal migrations, then the session store migration.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running portal migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
