//! Night Market Core - Shared domain types.
//!
//! This crate provides the types shared by every Night Market component:
//! - `web` - The vendor portal (vendor, staff and admin dashboards plus JSON API)
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Database encoding lives behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, roles, application statuses and form types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

#[doc(hidden)]
pub use uuid;
