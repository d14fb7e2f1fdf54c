//! Domain models for the portal.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod event;
pub mod form;
pub mod session;
pub mod shop;
pub mod user;

pub use event::{Event, ScheduledEvent};
pub use form::{Form, FormSummary};
pub use session::{CurrentUser, keys};
pub use shop::Shop;
pub use user::{User, VendorSummary};
