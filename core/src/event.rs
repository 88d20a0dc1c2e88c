//! Attendance records: generated events and stored rows.
//!
//! RULE: Aggregation reads attendance only through the `Attendance` trait,
//! so freshly sampled events and rows read back from a store are
//! counted by exactly the same code.

use crate::{
    grade::Grade,
    types::{GameId, Millis, StudentId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything that can be counted on the dashboard.
pub trait Attendance {
    fn checked_in_at(&self) -> DateTime<Utc>;

    /// The chartable grade, or `None` for Other / blank / unknown labels.
    fn canonical_grade(&self) -> Option<Grade>;

    fn checked_in_ms(&self) -> Millis {
        self.checked_in_at().timestamp_millis()
    }
}

/// One synthetic check-in produced by the sampler. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub timestamp: DateTime<Utc>,
    pub game_id: GameId,
    pub grade: Grade,
    pub student_id: StudentId,
    pub student_email: String,
}

impl AttendanceEvent {
    /// Convert for persistence. Identity columns are only attached on
    /// request so stores without matching user accounts accept the row.
    pub fn to_row(&self, attach_student: bool) -> AttendanceRow {
        AttendanceRow {
            created_at: self.timestamp,
            game_id: self.game_id.clone(),
            user_grade: Some(self.grade.as_str().to_string()),
            user_id: attach_student.then(|| self.student_id.clone()),
            user_email: attach_student.then(|| self.student_email.clone()),
        }
    }
}

impl Attendance for AttendanceEvent {
    fn checked_in_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn canonical_grade(&self) -> Option<Grade> {
        Some(self.grade).filter(Grade::is_canonical)
    }
}

/// An attendance row as persisted and read back from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRow {
    pub created_at: DateTime<Utc>,
    pub game_id: GameId,
    pub user_grade: Option<String>,
    pub user_id: Option<StudentId>,
    pub user_email: Option<String>,
}

impl Attendance for AttendanceRow {
    fn checked_in_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn canonical_grade(&self) -> Option<Grade> {
        Grade::canonical(self.user_grade.as_deref())
    }
}
