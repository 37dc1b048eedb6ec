//! Store trait definitions

use chrono::{DateTime, Local};
use warden_api::UserRef;
use warden_util::{DutyId, UserId};

use crate::{AuditEvent, StoreResult};

/// Persisted shape of a duty.
///
/// The core's `Duty` entity converts to and from this row type; the store
/// knows nothing about lifecycle rules.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DutyRecord {
    /// Row id; `None` until the store has assigned one
    pub id: Option<DutyId>,

    /// Owning user, absent for zombie duties
    pub user: Option<UserRef>,

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

/// Main store trait
pub trait Store: Send + Sync {
    // Duty rows

    /// Insert a new duty row and return its generated id.
    ///
    /// Fails with [`crate::StoreError::Conflict`] if the owning user already
    /// has a persisted duty (one-to-one constraint).
    fn create_duty(&self, record: &DutyRecord) -> StoreResult<DutyId>;

    /// Load a duty by id
    fn load_duty(&self, id: DutyId) -> StoreResult<Option<DutyRecord>>;

    /// Load the duty owned by the given user, if any
    fn duty_for_user(&self, user_id: &UserId) -> StoreResult<Option<DutyRecord>>;

    /// Persist mutable fields (timing, submission flags) of an existing row
    fn update_duty(&self, record: &DutyRecord) -> StoreResult<()>;

    /// Remove a duty row. Never touches user accounts.
    fn delete_duty(&self, id: DutyId) -> StoreResult<()>;

    /// Number of persisted duty rows
    fn count_duties(&self) -> StoreResult<u64>;

    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
