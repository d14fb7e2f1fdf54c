//! User domain types.

use chrono::{DateTime, Utc};

use night_market_core::{Email, Role, UserId};

/// A portal account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    /// Display name, optional for vendors created outside the seed.
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name to show in the UI, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.email.as_str())
    }
}

/// A vendor account with the number of shops it owns.
#[derive(Debug, Clone)]
pub struct VendorSummary {
    pub user: User,
    pub shop_count: i64,
    pub form_count: i64,
}
