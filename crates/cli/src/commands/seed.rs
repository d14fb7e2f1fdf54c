//! Seed the database with test accounts for local testing.
//!
//! Every role gets an account, and there is a second vendor so ownership
//! rules can be exercised between two shops.
//!
//! Safe to run repeatedly: existing accounts get their name, role and
//! password reset.

use night_market_core::Role;
use night_market_web::services::AuthService;

use super::{CliError, connect};

/// Password of every seeded account.
pub const SEED_PASSWORD: &str = "password123";

/// Seeded accounts: email, display name, role.
pub const SEED_ACCOUNTS: [(&str, &str, Role); 4] = [
    ("user@test.com", "Test User", Role::User),
    ("user2@test.com", "Test User 2", Role::User),
    ("staff@test.com", "Test Staff", Role::Staff),
    ("admin@test.com", "Test Admin", Role::Admin),
];

/// Create or reset the test accounts.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an account cannot be
/// written.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;
    let auth = AuthService::new(&pool);

    for (email, name, role) in SEED_ACCOUNTS {
        let user = auth.upsert(email, Some(name), SEED_PASSWORD, role).await?;
        tracing::info!(user_id = %user.id, "Seeded {} account", role);
    }

    tracing::info!("Seed complete! Sign in with:");
    for (email, _, role) in SEED_ACCOUNTS {
        tracing::info!("  {:<6} {} / {}", role.as_str(), email, SEED_PASSWORD);
    }
    Ok(())
}
