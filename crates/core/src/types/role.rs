//! Account roles.

use serde::{Deserialize, Serialize};

/// Role of a portal account.
///
/// Stored as the `user_role` Postgres enum with upper-case values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// A vendor submitting applications.
    User,
    /// Market staff reviewing applications.
    Staff,
    /// Administrators with bulk operations and account overview.
    Admin,
}

impl Role {
    pub const ALL: [Self; 3] = [Self::User, Self::Staff, Self::Admin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Staff => "STAFF",
            Self::Admin => "ADMIN",
        }
    }

    /// Japanese display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "出店者",
            Self::Staff => "スタッフ",
            Self::Admin => "管理者",
        }
    }

    /// Landing page after login.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::User => "/dashboard/user",
            Self::Staff => "/dashboard/staff",
            Self::Admin => "/dashboard/admin",
        }
    }

    /// Login portal segment (`/login/{portal}`) for this role.
    #[must_use]
    pub const fn portal(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    /// Parse a login portal segment.
    #[must_use]
    pub fn from_portal(portal: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.portal() == portal)
    }

    /// Whether this role may review applications.
    #[must_use]
    pub const fn can_review(self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "STAFF" => Ok(Self::Staff),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Staff".parse::<Role>().unwrap(), Role::Staff);
        assert!("vendor".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_upper_case() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
        let role: Role = serde_json::from_str("\"STAFF\"").unwrap();
        assert_eq!(role, Role::Staff);
    }

    #[test]
    fn test_portal_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::from_portal(role.portal()), Some(role));
        }
        assert_eq!(Role::from_portal("root"), None);
    }

    #[test]
    fn test_can_review() {
        assert!(!Role::User.can_review());
        assert!(Role::Staff.can_review());
        assert!(Role::Admin.can_review());
    }
}
