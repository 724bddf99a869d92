//! Core types for CampusCrew.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod event;
pub mod id;
pub mod role;

pub use email::{Email, EmailError};
pub use event::SecurityEventKind;
pub use id::*;
pub use role::AdminRole;
