//! Business logic services for the portal.
//!
//! # Services
//!
//! - `auth` - Password login and account registration
//! - `form_input` - Converts submitted HTML form fields into JSON payloads
//! - `review` - Status changes by staff and admins
//! - `schedule` - Event (attendance day) booking for approved forms
//! - `submission` - Vendor form submission with lazy shop creation

pub mod auth;
pub mod form_input;
pub mod review;
pub mod schedule;
pub mod submission;

pub use auth::{AuthError, AuthService};
pub use review::ReviewError;
pub use schedule::{EventChanges, EventInput, MonthGroup, ScheduleError, group_by_month};
pub use submission::SubmitError;
