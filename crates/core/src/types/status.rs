//! Application review status and bulk actions.

use serde::{Deserialize, Serialize};

/// Review status of an application form.
///
/// Any status may move to any other; only the value itself is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "form_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    /// Received, not yet looked at.
    #[default]
    Pending,
    Reviewing,
    /// Accepted subject to conditions in the admin notes.
    Conditional,
    Approved,
    Rejected,
}

impl FormStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Reviewing,
        Self::Conditional,
        Self::Approved,
        Self::Rejected,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Conditional => "conditional",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Label shown to staff and admins.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "受理",
            Self::Reviewing => "審査中",
            Self::Conditional => "条件提示",
            Self::Approved => "確定",
            Self::Rejected => "却下",
        }
    }

    /// Label shown to the vendor who submitted the form.
    #[must_use]
    pub const fn vendor_label(self) -> &'static str {
        match self {
            Self::Pending | Self::Reviewing => "審査中",
            Self::Conditional => "条件提示",
            Self::Approved => "承認済み",
            Self::Rejected => "却下",
        }
    }

    /// CSS modifier for status badges.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Pending => "badge-pending",
            Self::Reviewing => "badge-reviewing",
            Self::Conditional => "badge-conditional",
            Self::Approved => "badge-approved",
            Self::Rejected => "badge-rejected",
        }
    }

    /// Whether events may be scheduled against a form in this status.
    #[must_use]
    pub const fn allows_events(self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl std::fmt::Display for FormStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FormStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid form status: {s}"))
    }
}

/// Bulk decision applied to many applications at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Approve,
    Reject,
}

impl BulkAction {
    /// The status every selected form ends up in.
    #[must_use]
    pub const fn target_status(self) -> FormStatus {
        match self {
            Self::Approve => FormStatus::Approved,
            Self::Reject => FormStatus::Rejected,
        }
    }
}

impl std::str::FromStr for BulkAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(format!("invalid bulk action: {s}")),
        }
    }
}
