//! SQLite-based store implementation

use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};
use warden_api::UserRef;
use warden_util::{DutyId, UserId};

use crate::{AuditEvent, DutyRecord, Store, StoreError, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- Duty rows. UNIQUE(user_id) enforces one duty per user;
            -- NULL user_id (zombie duties) is exempt per SQLite semantics.
            CREATE TABLE IF NOT EXISTS duties (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT UNIQUE,
                user_name TEXT,
                duty_start TEXT NOT NULL,
                duty_end TEXT NOT NULL,
                task1_start TEXT NOT NULL,
                task1_end TEXT NOT NULL,
                task2_start TEXT NOT NULL,
                task2_end TEXT NOT NULL,
                task3_start TEXT NOT NULL,
                task3_end TEXT NOT NULL,
                is_task1_submitted INTEGER NOT NULL DEFAULT 0,
                is_task2_submitted INTEGER NOT NULL DEFAULT 0,
                is_task3_submitted INTEGER NOT NULL DEFAULT 0
            );

            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

/// Raw row shape before timestamp parsing
type RawDutyRow = (
    i64,
    Option<String>,
    Option<String>,
    [String; 8],
    [bool; 3],
);

fn parse_ts(s: &str) -> StoreResult<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| StoreError::Database(format!("bad timestamp '{s}': {e}")))
}

fn row_to_record(raw: RawDutyRow) -> StoreResult<DutyRecord> {
    let (id, user_id, user_name, ts, flags) = raw;

    let user = match user_id {
        Some(uid) => Some(UserRef {
            id: UserId::new(uid),
            name: user_name.unwrap_or_default(),
        }),
        None => None,
    };

    Ok(DutyRecord {
        id: Some(DutyId::from_row_id(id)),
        user,
        duty_start: parse_ts(&ts[0])?,
        duty_end: parse_ts(&ts[1])?,
        task1_start: parse_ts(&ts[2])?,
        task1_end: parse_ts(&ts[3])?,
        task2_start: parse_ts(&ts[4])?,
        task2_end: parse_ts(&ts[5])?,
        task3_start: parse_ts(&ts[6])?,
        task3_end: parse_ts(&ts[7])?,
        is_task1_submitted: flags[0],
        is_task2_submitted: flags[1],
        is_task3_submitted: flags[2],
    })
}

const DUTY_COLUMNS: &str = "id, user_id, user_name, \
    duty_start, duty_end, \
    task1_start, task1_end, task2_start, task2_end, task3_start, task3_end, \
    is_task1_submitted, is_task2_submitted, is_task3_submitted";

fn map_duty_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDutyRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        [
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
            row.get(9)?,
            row.get(10)?,
        ],
        [row.get(11)?, row.get(12)?, row.get(13)?],
    ))
}

impl Store for SqliteStore {
    fn create_duty(&self, record: &DutyRecord) -> StoreResult<DutyId> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO duties (
                user_id, user_name,
                duty_start, duty_end,
                task1_start, task1_end, task2_start, task2_end, task3_start, task3_end,
                is_task1_submitted, is_task2_submitted, is_task3_submitted
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                record.user.as_ref().map(|u| u.id.as_str()),
                record.user.as_ref().map(|u| u.name.as_str()),
                record.duty_start.to_rfc3339(),
                record.duty_end.to_rfc3339(),
                record.task1_start.to_rfc3339(),
                record.task1_end.to_rfc3339(),
                record.task2_start.to_rfc3339(),
                record.task2_end.to_rfc3339(),
                record.task3_start.to_rfc3339(),
                record.task3_end.to_rfc3339(),
                record.is_task1_submitted,
                record.is_task2_submitted,
                record.is_task3_submitted,
            ],
        )?;

        let id = DutyId::from_row_id(conn.last_insert_rowid());
        debug!(duty_id = %id, "Duty row created");
        Ok(id)
    }

    fn load_duty(&self, id: DutyId) -> StoreResult<Option<DutyRecord>> {
        let conn = self.conn.lock().unwrap();

        let raw = conn
            .query_row(
                &format!("SELECT {DUTY_COLUMNS} FROM duties WHERE id = ?"),
                [id.as_i64()],
                map_duty_row,
            )
            .optional()?;

        raw.map(row_to_record).transpose()
    }

    fn duty_for_user(&self, user_id: &UserId) -> StoreResult<Option<DutyRecord>> {
        let conn = self.conn.lock().unwrap();

        let raw = conn
            .query_row(
                &format!("SELECT {DUTY_COLUMNS} FROM duties WHERE user_id = ?"),
                [user_id.as_str()],
                map_duty_row,
            )
            .optional()?;

        raw.map(row_to_record).transpose()
    }

    fn update_duty(&self, record: &DutyRecord) -> StoreResult<()> {
        let id = record
            .id
            .ok_or_else(|| StoreError::NotFound("duty row has no id".into()))?;

        let conn = self.conn.lock().unwrap();

        let updated = conn.execute(
            r#"
            UPDATE duties SET
                user_id = ?, user_name = ?,
                duty_start = ?, duty_end = ?,
                task1_start = ?, task1_end = ?,
                task2_start = ?, task2_end = ?,
                task3_start = ?, task3_end = ?,
                is_task1_submitted = ?, is_task2_submitted = ?, is_task3_submitted = ?
            WHERE id = ?
            "#,
            params![
                record.user.as_ref().map(|u| u.id.as_str()),
                record.user.as_ref().map(|u| u.name.as_str()),
                record.duty_start.to_rfc3339(),
                record.duty_end.to_rfc3339(),
                record.task1_start.to_rfc3339(),
                record.task1_end.to_rfc3339(),
                record.task2_start.to_rfc3339(),
                record.task2_end.to_rfc3339(),
                record.task3_start.to_rfc3339(),
                record.task3_end.to_rfc3339(),
                record.is_task1_submitted,
                record.is_task2_submitted,
                record.is_task3_submitted,
                id.as_i64(),
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("duty {id}")));
        }

        debug!(duty_id = %id, "Duty row updated");
        Ok(())
    }

    fn delete_duty(&self, id: DutyId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM duties WHERE id = ?", [id.as_i64()])?;
        debug!(duty_id = %id, "Duty row deleted");
        Ok(())
    }

    fn count_duties(&self) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM duties", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Local))
                .unwrap_or_else(|_| warden_util::now());
            let event: crate::AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}
