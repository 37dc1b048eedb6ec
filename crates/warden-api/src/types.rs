//! Shared types for the warden boundary

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use warden_util::{DutyId, UserId};

/// Lightweight reference to a user account.
///
/// Accounts are managed by an external authentication layer; the core only
/// needs the opaque id and a display name for log lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

impl UserRef {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One of the three sub-task windows within a duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSlot {
    Task1,
    Task2,
    Task3,
}

impl TaskSlot {
    pub const ALL: [TaskSlot; 3] = [TaskSlot::Task1, TaskSlot::Task2, TaskSlot::Task3];
}

/// Serializable field set of a duty, for boundary responses.
///
/// This is the exact set an HTTP layer exposes: the eight derived timestamps
/// plus the submission flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyView {
    pub duty_id: DutyId,
    pub user_id: Option<UserId>,

    pub duty_start: DateTime<Local>,
    pub duty_end: DateTime<Local>,

    pub task1_start: DateTime<Local>,
    pub task1_end: DateTime<Local>,
    pub task2_start: DateTime<Local>,
    pub task2_end: DateTime<Local>,
    pub task3_start: DateTime<Local>,
    pub task3_end: DateTime<Local>,

    pub is_task1_submitted: bool,
    pub is_task2_submitted: bool,
    pub is_task3_submitted: bool,
}

/// Snapshot of the manager's slot for status endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutySnapshot {
    pub api_version: u32,
    /// The occupant, if the slot is active
    pub active_duty: Option<DutyView>,
}

/// Structured fault codes for the boundary layer.
///
/// The core returns typed errors; the boundary maps them onto these wire
/// shapes (and onto transport status codes) without string parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DutyFault {
    /// A duty is already active; clear it first
    StartDenied,
    /// The active duty has not finished yet
    ClearDenied { duty_end: DateTime<Local> },
    /// Behalf cannot be set on an ownerless duty
    BehalfRejected,
    /// The requesting identity does not match the slot owner. Signals a
    /// missed cleanup of an expired duty; boundaries should treat this as a
    /// server-side integrity failure, not a user error.
    OwnerMismatch {
        requested_by: UserId,
        slot_owner: Option<UserId>,
    },
    /// Persistence failure underneath a lifecycle operation
    StoreFailure { detail: String },
}
