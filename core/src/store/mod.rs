//! Attendance persistence.
//!
//! RULE: Only the store talks to the database.
//! The seeder and check-in service go through `AttendanceStore`, so they
//! can run against SQLite, an in-memory database, or a test double.

use crate::{error::CheckinResult, event::AttendanceRow};
use rusqlite::Connection;

mod attendance;

/// Which rows to read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameFilter {
    All,
    Game(String),
}

/// Tabular attendance store keyed by (user_id, game_id).
pub trait AttendanceStore {
    /// Plain insert of every row, in one transaction.
    fn insert_batch(&self, rows: &[AttendanceRow]) -> CheckinResult<usize>;

    /// Insert, skipping rows whose (user_id, game_id) already exists.
    /// Returns the number of rows actually written, so retries are safe.
    fn upsert_batch(&self, rows: &[AttendanceRow]) -> CheckinResult<usize>;

    /// Record a single check-in. A duplicate (user_id, game_id) is
    /// reported as `CheckinError::AlreadyRecorded`.
    fn record(&self, row: &AttendanceRow) -> CheckinResult<()>;

    /// Rows ordered by check-in time, newest first.
    fn rows(&self, filter: &GameFilter) -> CheckinResult<Vec<AttendanceRow>>;

    /// Delete every row. Returns how many were removed.
    fn clear(&self) -> CheckinResult<usize>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the attendance database at `path`.
    pub fn open(path: &str) -> CheckinResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL only applies to real files; in-memory URIs ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> CheckinResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply the schema. Safe to call on an existing database.
    pub fn migrate(&self) -> CheckinResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_attendance.sql"))?;
        Ok(())
    }
}
