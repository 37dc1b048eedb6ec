//! Audit event types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use warden_util::{DutyId, UserId};

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Duty started and slot occupied
    DutyStarted {
        duty_id: DutyId,
        user_id: Option<UserId>,
        duty_end: DateTime<Local>,
    },

    /// Start attempt rejected because a duty was active
    StartDenied {
        requested_by: UserId,
        active_duty_id: DutyId,
    },

    /// Duty cleared through the normal finished path
    DutyCleared {
        duty_id: DutyId,
        user_id: Option<UserId>,
    },

    /// Duty removed by an administrative force clear
    DutyForceCleared {
        duty_id: DutyId,
        user_id: Option<UserId>,
    },

    /// Duty end moved by an administrative fast-forward
    DutyFastForwarded {
        duty_id: DutyId,
        next_minutes: i64,
        new_duty_end: DateTime<Local>,
    },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: warden_util::now(),
            event,
        }
    }
}
