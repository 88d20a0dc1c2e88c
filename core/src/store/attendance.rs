use super::{AttendanceStore, GameFilter, SqliteStore};
use crate::{
    error::{CheckinError, CheckinResult},
    event::AttendanceRow,
};
use chrono::DateTime;
use rusqlite::{params, Row};

const INSERT_SQL: &str = "INSERT INTO attendance
    (created_at_ms, game_id, user_grade, user_id, user_email)
    VALUES (?1, ?2, ?3, ?4, ?5)";

const UPSERT_SQL: &str = "INSERT INTO attendance
    (created_at_ms, game_id, user_grade, user_id, user_email)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (user_id, game_id) DO NOTHING";

const SELECT_COLUMNS: &str = "SELECT created_at_ms, game_id, user_grade, user_id, user_email
    FROM attendance";

impl SqliteStore {
    fn write_batch(&self, sql: &str, rows: &[AttendanceRow]) -> CheckinResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare_cached(sql)?;
            for row in rows {
                written += stmt.execute(params![
                    row.created_at.timestamp_millis(),
                    row.game_id,
                    row.user_grade,
                    row.user_id,
                    row.user_email,
                ])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }
}

impl AttendanceStore for SqliteStore {
    fn insert_batch(&self, rows: &[AttendanceRow]) -> CheckinResult<usize> {
        self.write_batch(INSERT_SQL, rows)
    }

    fn upsert_batch(&self, rows: &[AttendanceRow]) -> CheckinResult<usize> {
        self.write_batch(UPSERT_SQL, rows)
    }

    fn record(&self, row: &AttendanceRow) -> CheckinResult<()> {
        let result = self.conn.execute(
            INSERT_SQL,
            params![
                row.created_at.timestamp_millis(),
                row.game_id,
                row.user_grade,
                row.user_id,
                row.user_email,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(CheckinError::AlreadyRecorded {
                game_id: row.game_id.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn rows(&self, filter: &GameFilter) -> CheckinResult<Vec<AttendanceRow>> {
        let rows = match filter {
            GameFilter::All => {
                let mut stmt = self.conn.prepare(&format!(
                    "{SELECT_COLUMNS} ORDER BY created_at_ms DESC, id DESC"
                ))?;
                let rows = stmt
                    .query_map([], map_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            GameFilter::Game(game_id) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{SELECT_COLUMNS} WHERE game_id = ?1 ORDER BY created_at_ms DESC, id DESC"
                ))?;
                let rows = stmt
                    .query_map(params![game_id], map_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }

    fn clear(&self) -> CheckinResult<usize> {
        Ok(self.conn.execute("DELETE FROM attendance", [])?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<AttendanceRow> {
    let ms: i64 = row.get(0)?;
    let created_at =
        DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(0, ms))?;
    Ok(AttendanceRow {
        created_at,
        game_id: row.get(1)?,
        user_grade: row.get(2)?,
        user_id: row.get(3)?,
        user_email: row.get(4)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
