//! Duty entity: one shift with three fixed sub-task windows

use chrono::{DateTime, Duration, Local};
use std::fmt;
use warden_api::{DutyView, TaskSlot, UserRef};
use warden_store::DutyRecord;
use warden_util::{format_datetime_full, DutyError, DutyId};

/// Minutes from shift start until each sub-task opens
pub const TASK1_MARK: i64 = 30;
pub const TASK2_MARK: i64 = 90;
pub const TASK3_MARK: i64 = 150;

/// Width of every sub-task window, in minutes
pub const TASK_WINDOW: i64 = 30;

/// Total shift length, in minutes
pub const DUTY_DURATION: i64 = 180;

/// One timed work shift.
///
/// All eight timestamps are derived once from the shift start; after that
/// they only move through [`Duty::update_duty_end`] and
/// [`Duty::update_tasks_end`]. The entity knows nothing about exclusivity --
/// that is the manager's job.
#[derive(Debug, Clone)]
pub struct Duty {
    id: DutyId,
    user: Option<UserRef>,

    /// Secondary user this shift is performed on behalf of. Transient: not
    /// written to the store.
    behalf: Option<UserRef>,

    duty_start: DateTime<Local>,
    duty_end: DateTime<Local>,

    task1_start: DateTime<Local>,
    task1_end: DateTime<Local>,
    task2_start: DateTime<Local>,
    task2_end: DateTime<Local>,
    task3_start: DateTime<Local>,
    task3_end: DateTime<Local>,

    is_task1_submitted: bool,
    is_task2_submitted: bool,
    is_task3_submitted: bool,
}

impl Duty {
    /// Derive a fresh schedule starting at `now`.
    ///
    /// Returns a record without an id; the store assigns one on insert.
    pub fn schedule(user: Option<UserRef>, now: DateTime<Local>) -> DutyRecord {
        let task1_start = now + Duration::minutes(TASK1_MARK);
        let task2_start = now + Duration::minutes(TASK2_MARK);
        let task3_start = now + Duration::minutes(TASK3_MARK);

        DutyRecord {
            id: None,
            user,
            duty_start: now,
            duty_end: now + Duration::minutes(DUTY_DURATION),
            task1_start,
            task1_end: task1_start + Duration::minutes(TASK_WINDOW),
            task2_start,
            task2_end: task2_start + Duration::minutes(TASK_WINDOW),
            task3_start,
            task3_end: task3_start + Duration::minutes(TASK_WINDOW),
            is_task1_submitted: false,
            is_task2_submitted: false,
            is_task3_submitted: false,
        }
    }

    /// Rehydrate from a persisted row. Returns `None` if the row has no id.
    pub fn from_record(record: DutyRecord) -> Option<Self> {
        let id = record.id?;
        Some(Self {
            id,
            user: record.user,
            behalf: None,
            duty_start: record.duty_start,
            duty_end: record.duty_end,
            task1_start: record.task1_start,
            task1_end: record.task1_end,
            task2_start: record.task2_start,
            task2_end: record.task2_end,
            task3_start: record.task3_start,
            task3_end: record.task3_end,
            is_task1_submitted: record.is_task1_submitted,
            is_task2_submitted: record.is_task2_submitted,
            is_task3_submitted: record.is_task3_submitted,
        })
    }

    /// Row shape for persistence
    pub fn to_record(&self) -> DutyRecord {
        DutyRecord {
            id: Some(self.id),
            user: self.user.clone(),
            duty_start: self.duty_start,
            duty_end: self.duty_end,
            task1_start: self.task1_start,
            task1_end: self.task1_end,
            task2_start: self.task2_start,
            task2_end: self.task2_end,
            task3_start: self.task3_start,
            task3_end: self.task3_end,
            is_task1_submitted: self.is_task1_submitted,
            is_task2_submitted: self.is_task2_submitted,
            is_task3_submitted: self.is_task3_submitted,
        }
    }

    pub fn id(&self) -> DutyId {
        self.id
    }

    pub fn user(&self) -> Option<&UserRef> {
        self.user.as_ref()
    }

    pub fn duty_start(&self) -> DateTime<Local> {
        self.duty_start
    }

    pub fn duty_end(&self) -> DateTime<Local> {
        self.duty_end
    }

    /// The `[start, end)` interval of a sub-task window
    pub fn task_window(&self, slot: TaskSlot) -> (DateTime<Local>, DateTime<Local>) {
        match slot {
            TaskSlot::Task1 => (self.task1_start, self.task1_end),
            TaskSlot::Task2 => (self.task2_start, self.task2_end),
            TaskSlot::Task3 => (self.task3_start, self.task3_end),
        }
    }

    pub fn is_task_submitted(&self, slot: TaskSlot) -> bool {
        match slot {
            TaskSlot::Task1 => self.is_task1_submitted,
            TaskSlot::Task2 => self.is_task2_submitted,
            TaskSlot::Task3 => self.is_task3_submitted,
        }
    }

    pub fn mark_task_submitted(&mut self, slot: TaskSlot) {
        match slot {
            TaskSlot::Task1 => self.is_task1_submitted = true,
            TaskSlot::Task2 => self.is_task2_submitted = true,
            TaskSlot::Task3 => self.is_task3_submitted = true,
        }
    }

    /// The shift has ended strictly before `now`
    pub fn is_finished(&self, now: DateTime<Local>) -> bool {
        self.duty_end < now
    }

    /// Overwrite task ends that are explicitly provided; absent values leave
    /// the corresponding field unchanged.
    ///
    /// No monotonicity check here -- callers own forward movement.
    pub fn update_tasks_end(
        &mut self,
        task1_end: Option<DateTime<Local>>,
        task2_end: Option<DateTime<Local>>,
        task3_end: Option<DateTime<Local>>,
    ) {
        if let Some(end) = task1_end {
            self.task1_end = end;
        }
        if let Some(end) = task2_end {
            self.task2_end = end;
        }
        if let Some(end) = task3_end {
            self.task3_end = end;
        }
    }

    /// Move the shift end to `new_end`, bumping any task end that would
    /// otherwise trail behind it.
    ///
    /// Passing a time in the past is the supported way to expire a shift
    /// immediately; task ends already past `new_end` are left alone.
    pub fn update_duty_end(&mut self, new_end: DateTime<Local>) {
        if self.task1_end < new_end {
            self.task1_end = new_end;
        }
        if self.task2_end < new_end {
            self.task2_end = new_end;
        }
        if self.task3_end < new_end {
            self.task3_end = new_end;
        }

        self.duty_end = new_end;
    }

    pub fn behalf(&self) -> Option<&UserRef> {
        self.behalf.as_ref()
    }

    /// Attach the user this shift is performed on behalf of.
    ///
    /// Requires an owner to already be present.
    pub fn set_behalf(&mut self, behalf: UserRef) -> Result<(), DutyError> {
        if self.user.is_none() {
            return Err(DutyError::BehalfWithNoUser);
        }
        self.behalf = Some(behalf);
        Ok(())
    }

    /// Serializable field set for the boundary layer
    pub fn to_view(&self) -> DutyView {
        DutyView {
            duty_id: self.id,
            user_id: self.user.as_ref().map(|u| u.id.clone()),
            duty_start: self.duty_start,
            duty_end: self.duty_end,
            task1_start: self.task1_start,
            task1_end: self.task1_end,
            task2_start: self.task2_start,
            task2_end: self.task2_end,
            task3_start: self.task3_start,
            task3_end: self.task3_end,
            is_task1_submitted: self.is_task1_submitted,
            is_task2_submitted: self.is_task2_submitted,
            is_task3_submitted: self.is_task3_submitted,
        }
    }
}

impl fmt::Display for Duty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user {
            Some(user) => write!(
                f,
                "Duty from |{}| to |{}| by {}",
                format_datetime_full(&self.duty_start),
                format_datetime_full(&self.duty_end),
                user.name
            ),
            None => write!(
                f,
                "Zombie duty from |{}| to |{}|",
                format_datetime_full(&self.duty_start),
                format_datetime_full(&self.duty_end)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn make_duty(user: Option<UserRef>, now: DateTime<Local>) -> Duty {
        let mut record = Duty::schedule(user, now);
        record.id = Some(DutyId::from_row_id(1));
        Duty::from_record(record).unwrap()
    }

    #[test]
    fn schedule_derives_all_marks() {
        let t0 = noon();
        let record = Duty::schedule(Some(UserRef::new("alice", "Alice")), t0);

        assert_eq!(record.duty_start, t0);
        assert_eq!(record.task1_start, t0 + Duration::minutes(30));
        assert_eq!(record.task2_start, t0 + Duration::minutes(90));
        assert_eq!(record.task3_start, t0 + Duration::minutes(150));

        assert_eq!(record.duty_end, t0 + Duration::minutes(180));
        assert_eq!(record.task1_end, record.task1_start + Duration::minutes(30));
        assert_eq!(record.task2_end, record.task2_start + Duration::minutes(30));
        assert_eq!(record.task3_end, record.task3_start + Duration::minutes(30));

        assert!(!record.is_task1_submitted);
        assert!(!record.is_task2_submitted);
        assert!(!record.is_task3_submitted);
    }

    #[test]
    fn noon_scenario_windows() {
        // Shift at 12:00:00 -> windows [12:30,13:00), [13:30,14:00),
        // [14:30,15:00), end 15:00:00
        let duty = make_duty(None, noon());

        let (s1, e1) = duty.task_window(TaskSlot::Task1);
        assert_eq!(s1, Local.with_ymd_and_hms(2026, 3, 14, 12, 30, 0).unwrap());
        assert_eq!(e1, Local.with_ymd_and_hms(2026, 3, 14, 13, 0, 0).unwrap());

        let (s2, e2) = duty.task_window(TaskSlot::Task2);
        assert_eq!(s2, Local.with_ymd_and_hms(2026, 3, 14, 13, 30, 0).unwrap());
        assert_eq!(e2, Local.with_ymd_and_hms(2026, 3, 14, 14, 0, 0).unwrap());

        let (s3, e3) = duty.task_window(TaskSlot::Task3);
        assert_eq!(s3, Local.with_ymd_and_hms(2026, 3, 14, 14, 30, 0).unwrap());
        assert_eq!(e3, Local.with_ymd_and_hms(2026, 3, 14, 15, 0, 0).unwrap());

        assert_eq!(
            duty.duty_end(),
            Local.with_ymd_and_hms(2026, 3, 14, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn from_record_requires_id() {
        let record = Duty::schedule(None, noon());
        assert!(Duty::from_record(record).is_none());
    }

    #[test]
    fn update_tasks_end_applies_only_provided() {
        let mut duty = make_duty(None, noon());
        let (_, original_e1) = duty.task_window(TaskSlot::Task1);
        let (_, original_e3) = duty.task_window(TaskSlot::Task3);

        let new_e2 = noon() + Duration::minutes(200);
        duty.update_tasks_end(None, Some(new_e2), None);

        assert_eq!(duty.task_window(TaskSlot::Task1).1, original_e1);
        assert_eq!(duty.task_window(TaskSlot::Task2).1, new_e2);
        assert_eq!(duty.task_window(TaskSlot::Task3).1, original_e3);
    }

    #[test]
    fn update_duty_end_bumps_trailing_task_ends() {
        let mut duty = make_duty(None, noon());
        let extended = noon() + Duration::minutes(240); // past every task end

        duty.update_duty_end(extended);

        assert_eq!(duty.duty_end(), extended);
        for slot in TaskSlot::ALL {
            assert_eq!(duty.task_window(slot).1, extended);
        }
    }

    #[test]
    fn update_duty_end_into_past_leaves_task_ends() {
        let mut duty = make_duty(None, noon());
        let (_, e1) = duty.task_window(TaskSlot::Task1);

        let past = noon() - Duration::minutes(1);
        duty.update_duty_end(past);

        assert_eq!(duty.duty_end(), past);
        // Task ends are all after `past`, so none get bumped
        assert_eq!(duty.task_window(TaskSlot::Task1).1, e1);
        assert!(duty.is_finished(noon()));
    }

    #[test]
    fn is_finished_is_strict() {
        let duty = make_duty(None, noon());
        let end = duty.duty_end();

        assert!(!duty.is_finished(end));
        assert!(duty.is_finished(end + Duration::seconds(1)));
    }

    #[test]
    fn behalf_requires_owner() {
        let mut zombie = make_duty(None, noon());
        let helper = UserRef::new("bob", "Bob");

        let err = zombie.set_behalf(helper.clone()).unwrap_err();
        assert!(matches!(err, DutyError::BehalfWithNoUser));
        assert!(zombie.behalf().is_none());

        let mut owned = make_duty(Some(UserRef::new("alice", "Alice")), noon());
        owned.set_behalf(helper.clone()).unwrap();
        assert_eq!(owned.behalf(), Some(&helper));
    }

    #[test]
    fn behalf_is_transient() {
        let mut duty = make_duty(Some(UserRef::new("alice", "Alice")), noon());
        duty.set_behalf(UserRef::new("bob", "Bob")).unwrap();

        let reloaded = Duty::from_record(duty.to_record()).unwrap();
        assert!(reloaded.behalf().is_none());
    }

    #[test]
    fn submitted_flags_round_trip() {
        let mut duty = make_duty(Some(UserRef::new("alice", "Alice")), noon());
        assert!(!duty.is_task_submitted(TaskSlot::Task2));

        duty.mark_task_submitted(TaskSlot::Task2);
        assert!(duty.is_task_submitted(TaskSlot::Task2));
        assert!(!duty.is_task_submitted(TaskSlot::Task1));

        let reloaded = Duty::from_record(duty.to_record()).unwrap();
        assert!(reloaded.is_task_submitted(TaskSlot::Task2));
    }

    #[test]
    fn display_distinguishes_zombies() {
        let owned = make_duty(Some(UserRef::new("alice", "Alice")), noon());
        let rendered = owned.to_string();
        assert!(rendered.contains("Alice"));
        assert!(rendered.starts_with("Duty from"));

        let zombie = make_duty(None, noon());
        assert!(zombie.to_string().starts_with("Zombie duty from"));
    }

    #[test]
    fn view_exposes_the_serialization_field_set() {
        let user = UserRef::new("alice", "Alice");
        let duty = make_duty(Some(user.clone()), noon());
        let view = duty.to_view();

        assert_eq!(view.duty_id, duty.id());
        assert_eq!(view.user_id, Some(user.id));
        assert_eq!(view.duty_start, duty.duty_start());
        assert_eq!(view.duty_end, duty.duty_end());
        assert_eq!(view.task1_start, duty.task_window(TaskSlot::Task1).0);
        assert_eq!(view.task3_end, duty.task_window(TaskSlot::Task3).1);
    }
}
