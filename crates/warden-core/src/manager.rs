//! Single-slot duty coordinator

use chrono::{DateTime, Duration, Local};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, info, warn};
use warden_api::{TaskSlot, UserRef};
use warden_store::{AuditEvent, AuditEventType, Store};
use warden_util::{DutyError, UserId};

use crate::{CoreEvent, Duty};

/// Handle to the process-wide manager instance
pub type SharedDutyManager = Arc<Mutex<DutyManager>>;

static SHARED: OnceLock<SharedDutyManager> = OnceLock::new();

/// Coordinator enforcing the at-most-one-active-duty invariant.
///
/// State machine over a single slot: Empty -> Active -> Empty. Every
/// operation is a short synchronous critical section; multi-threaded callers
/// go through the mutex in [`SharedDutyManager`], which serializes the
/// check-then-act Empty -> Active transition.
///
/// Time-sensitive operations take `now` explicitly so tests can fast-forward
/// without sleeping.
pub struct DutyManager {
    store: Arc<dyn Store>,
    slot: Option<Duty>,
}

impl DutyManager {
    /// Create a manager with an empty slot.
    ///
    /// The composition root owns the instance; request handlers receive a
    /// handle, never construct their own.
    pub fn new(store: Arc<dyn Store>) -> Self {
        info!("Duty manager initialized");
        Self { store, slot: None }
    }

    /// Install a process-wide instance on first call and hand out the same
    /// handle on every subsequent call.
    ///
    /// The `store` argument is only consulted the first time; later calls
    /// return the already-installed manager unchanged.
    pub fn shared(store: Arc<dyn Store>) -> SharedDutyManager {
        SHARED
            .get_or_init(|| Arc::new(Mutex::new(Self::new(store))))
            .clone()
    }

    /// The current occupant, if any
    pub fn duty(&self) -> Option<&Duty> {
        self.slot.as_ref()
    }

    /// Owner of the current occupant, if any
    pub fn user(&self) -> Option<&UserRef> {
        self.slot.as_ref().and_then(|d| d.user())
    }

    pub fn has_active_duty(&self) -> bool {
        self.slot.is_some()
    }

    /// Whether the slot owner matches the given identity.
    ///
    /// Boundary layers use this for their caller-vs-occupant consistency
    /// check; a mismatch on an authenticated duty request signals an expired
    /// duty that was never cleared.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user().is_some_and(|u| &u.id == user_id)
    }

    /// Whether the occupant's end time has passed.
    ///
    /// An empty slot counts as finished: there is nothing left to wait on.
    pub fn is_duty_finished(&self, now: DateTime<Local>) -> bool {
        match &self.slot {
            Some(duty) => duty.is_finished(now),
            None => true,
        }
    }

    /// Start a new duty owned by `user` and occupy the slot.
    ///
    /// Fails with [`DutyError::CannotStartOverOngoingDuty`] while the slot is
    /// occupied; state is untouched in that case.
    pub fn start_duty(&mut self, user: UserRef, now: DateTime<Local>) -> Result<CoreEvent, DutyError> {
        if let Some(active) = &self.slot {
            let _ = self.store.append_audit(AuditEvent::new(AuditEventType::StartDenied {
                requested_by: user.id.clone(),
                active_duty_id: active.id(),
            }));

            warn!(
                requested_by = %user.id,
                active_duty_id = %active.id(),
                "Start denied, duty already active"
            );

            return Err(DutyError::CannotStartOverOngoingDuty);
        }

        let mut record = Duty::schedule(Some(user), now);
        let id = self
            .store
            .create_duty(&record)
            .map_err(|e| DutyError::store(e.to_string()))?;
        record.id = Some(id);

        let duty = match Duty::from_record(record) {
            Some(d) => d,
            None => return Err(DutyError::store("store returned a duty without an id")),
        };

        let user_id = duty.user().map(|u| u.id.clone());
        let duty_end = duty.duty_end();

        let _ = self.store.append_audit(AuditEvent::new(AuditEventType::DutyStarted {
            duty_id: duty.id(),
            user_id: user_id.clone(),
            duty_end,
        }));

        info!(
            duty_id = %duty.id(),
            duty = %duty,
            duty_end = %duty_end,
            "Duty started"
        );

        let event = CoreEvent::DutyStarted {
            duty_id: duty.id(),
            user_id,
            duty_end,
        };

        self.slot = Some(duty);

        Ok(event)
    }

    /// Clear the occupant once its end time has passed.
    ///
    /// Deletes the duty row (never its owner) and empties the slot. Returns
    /// `Ok(None)` when the slot was already empty. Fails with
    /// [`DutyError::CannotClearUnfinishedDuty`] while the occupant is still
    /// running; state is untouched in that case.
    pub fn clear_duty(&mut self, now: DateTime<Local>) -> Result<Option<CoreEvent>, DutyError> {
        let Some(duty) = &self.slot else {
            debug!("Clear requested with empty slot");
            return Ok(None);
        };

        if !duty.is_finished(now) {
            return Err(DutyError::CannotClearUnfinishedDuty {
                duty_end: duty.duty_end(),
            });
        }

        self.remove_occupant(false)
    }

    /// Remove the occupant unconditionally, bypassing the finished check.
    ///
    /// Administrative path; also backs [`DutyManager::reset`].
    pub fn force_clear(&mut self) -> Result<Option<CoreEvent>, DutyError> {
        self.remove_occupant(true)
    }

    /// Clear all manager state unconditionally.
    ///
    /// Alias for [`DutyManager::force_clear`], for full resets between
    /// isolated runs.
    pub fn reset(&mut self) -> Result<(), DutyError> {
        self.force_clear().map(|_| ())
    }

    fn remove_occupant(&mut self, forced: bool) -> Result<Option<CoreEvent>, DutyError> {
        let Some(duty) = self.slot.take() else {
            return Ok(None);
        };

        if let Err(e) = self.store.delete_duty(duty.id()) {
            // Leave the slot occupied so state and store stay in step
            let err = DutyError::store(e.to_string());
            self.slot = Some(duty);
            return Err(err);
        }

        let user_id = duty.user().map(|u| u.id.clone());

        let audit = if forced {
            AuditEventType::DutyForceCleared {
                duty_id: duty.id(),
                user_id: user_id.clone(),
            }
        } else {
            AuditEventType::DutyCleared {
                duty_id: duty.id(),
                user_id: user_id.clone(),
            }
        };
        let _ = self.store.append_audit(AuditEvent::new(audit));

        info!(duty_id = %duty.id(), forced, "Duty cleared");

        let event = if forced {
            CoreEvent::DutyForceCleared {
                duty_id: duty.id(),
                user_id,
            }
        } else {
            CoreEvent::DutyCleared {
                duty_id: duty.id(),
                user_id,
            }
        };

        Ok(Some(event))
    }

    /// Move the occupant's end to `now + next_minutes` and persist it.
    ///
    /// Negative minutes are the supported way to bring a duty to a finished
    /// state deterministically. No-op (`Ok(None)`) when the slot is empty.
    pub fn force_fast_forward_duty(
        &mut self,
        next_minutes: i64,
        now: DateTime<Local>,
    ) -> Result<Option<CoreEvent>, DutyError> {
        let Some(duty) = &mut self.slot else {
            debug!("Fast-forward requested with empty slot");
            return Ok(None);
        };

        let target = now + Duration::minutes(next_minutes);
        duty.update_duty_end(target);

        self.store
            .update_duty(&duty.to_record())
            .map_err(|e| DutyError::store(e.to_string()))?;

        let _ = self.store.append_audit(AuditEvent::new(AuditEventType::DutyFastForwarded {
            duty_id: duty.id(),
            next_minutes,
            new_duty_end: target,
        }));

        info!(
            duty_id = %duty.id(),
            next_minutes,
            new_duty_end = %target,
            "Duty fast-forwarded"
        );

        Ok(Some(CoreEvent::DutyFastForwarded {
            duty_id: duty.id(),
            next_minutes,
            new_duty_end: target,
        }))
    }

    /// Mark a sub-task submitted on the occupant and persist the flag.
    ///
    /// Returns `false` when the slot is empty.
    pub fn submit_task(&mut self, task: TaskSlot) -> Result<bool, DutyError> {
        let Some(duty) = &mut self.slot else {
            return Ok(false);
        };

        duty.mark_task_submitted(task);

        self.store
            .update_duty(&duty.to_record())
            .map_err(|e| DutyError::store(e.to_string()))?;

        debug!(duty_id = %duty.id(), task = ?task, "Task submission recorded");
        Ok(true)
    }
}
