//! Shared utilities for warden
//!
//! This crate provides:
//! - ID types (DutyId, UserId)
//! - Time utilities (wall clock with mock support, duration helpers)
//! - The core error type

mod error;
mod ids;
mod time;

pub use error::*;
pub use ids::*;
pub use time::*;
