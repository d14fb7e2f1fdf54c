//! Core types for the Night Market vendor portal.
//!
//! This module provides type-safe wrappers for the portal's domain concepts.

pub mod email;
pub mod form;
pub mod id;
pub mod payload;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use form::{Choice, Field, FieldKind, FormType, Section, required_fields};
pub use payload::PayloadError;
pub use id::*;
pub use role::Role;
pub use status::*;
