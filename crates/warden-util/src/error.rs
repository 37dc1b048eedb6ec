//! Error types for warden

use chrono::{DateTime, Local};
use thiserror::Error;

/// Core error type for duty lifecycle operations.
///
/// Every variant is returned synchronously at the point of violation and
/// carries structured data rather than a pre-formatted message, so a boundary
/// layer can branch on kind and render its own text.
#[derive(Debug, Error)]
pub enum DutyError {
    /// An active duty already occupies the slot; it must be cleared before a
    /// new one can start.
    #[error("an ongoing duty must be cleared before starting a new one")]
    CannotStartOverOngoingDuty,

    /// The active duty has not reached its end time yet. Carries the pending
    /// end so callers can display when clearing becomes possible.
    #[error("ongoing duty has not reached its end time ({duty_end}); wait or force clear")]
    CannotClearUnfinishedDuty { duty_end: DateTime<Local> },

    /// A behalf user can only be attached to a duty that has an owner.
    #[error("cannot set behalf on a duty with no owner; set the user first")]
    BehalfWithNoUser,

    /// The persistence layer failed underneath a lifecycle operation.
    #[error("store error: {0}")]
    Store(String),
}

impl DutyError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DutyError>;
