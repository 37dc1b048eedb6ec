//! Core events emitted by the duty manager

use chrono::{DateTime, Local};
use warden_util::{DutyId, UserId};

/// Events emitted by lifecycle operations, for a boundary layer to relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// A duty was started and now occupies the slot
    DutyStarted {
        duty_id: DutyId,
        user_id: Option<UserId>,
        duty_end: DateTime<Local>,
    },

    /// The finished duty was cleared and the slot emptied
    DutyCleared {
        duty_id: DutyId,
        user_id: Option<UserId>,
    },

    /// The duty was removed administratively, bypassing the finished check
    DutyForceCleared {
        duty_id: DutyId,
        user_id: Option<UserId>,
    },

    /// The duty end was moved by an administrative fast-forward
    DutyFastForwarded {
        duty_id: DutyId,
        next_minutes: i64,
        new_duty_end: DateTime<Local>,
    },
}
