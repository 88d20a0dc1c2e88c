//! Live check-in for an authenticated student.

use crate::{
    error::{CheckinError, CheckinResult},
    event::AttendanceRow,
    game::GameCatalog,
    geo::{distance_miles, within_radius, Coordinates},
    grade::{Grade, GradeClassifier},
    store::AttendanceStore,
    types::StudentId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who is checking in, as established by the auth layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentIdentity {
    pub user_id: StudentId,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub game_id: String,
    pub student: StudentIdentity,
    /// Device location, required only for games with a venue geofence.
    #[serde(default)]
    pub location: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckInOutcome {
    Recorded { grade: Grade },
    AlreadyCheckedIn,
}

pub struct CheckInService<'a, S: AttendanceStore + ?Sized> {
    store: &'a S,
    catalog: &'a GameCatalog,
    classifier: &'a GradeClassifier,
}

impl<'a, S: AttendanceStore + ?Sized> CheckInService<'a, S> {
    pub fn new(store: &'a S, catalog: &'a GameCatalog, classifier: &'a GradeClassifier) -> Self {
        Self {
            store,
            catalog,
            classifier,
        }
    }

    pub fn check_in(
        &self,
        req: &CheckInRequest,
        now: DateTime<Utc>,
    ) -> CheckinResult<CheckInOutcome> {
        let game = self.catalog.find(&req.game_id)?;
        if !game.window()?.contains(now) {
            return Err(CheckinError::WindowClosed {
                game_id: game.id.clone(),
            });
        }

        if let Some(venue) = game.venue {
            let location = req.location.ok_or_else(|| CheckinError::LocationRequired {
                game_id: game.id.clone(),
            })?;
            if !within_radius(location, venue.coordinates(), venue.radius_miles) {
                return Err(CheckinError::OutOfRange {
                    game_id: game.id.clone(),
                    distance_miles: distance_miles(location, venue.coordinates()),
                });
            }
        }

        let grade = self.classifier.classify(&req.student.email);
        let row = AttendanceRow {
            created_at: now,
            game_id: game.id.clone(),
            user_grade: Some(grade.as_str().to_string()),
            user_id: Some(req.student.user_id.clone()),
            user_email: Some(req.student.email.clone()),
        };

        match self.store.record(&row) {
            Ok(()) => {
                log::info!("check-in: game={} grade={grade}", game.id);
                Ok(CheckInOutcome::Recorded { grade })
            }
            Err(CheckinError::AlreadyRecorded { .. }) => {
                log::debug!("check-in: game={} duplicate for {}", game.id, req.student.user_id);
                Ok(CheckInOutcome::AlreadyCheckedIn)
            }
            Err(e) => Err(e),
        }
    }
}
