//! Shop domain type.

use chrono::{DateTime, Utc};

use night_market_core::{ShopId, UserId};

/// A vendor's business profile.
///
/// Created on the vendor's first submission and reused afterwards.
#[derive(Debug, Clone)]
pub struct Shop {
    pub id: ShopId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
