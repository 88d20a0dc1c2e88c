//! Live check-in flow.

use checkin_core::{
    checkin::{CheckInOutcome, CheckInRequest, CheckInService, StudentIdentity},
    config::AppConfig,
    error::CheckinError,
    game::{GameCatalog, GameConfig, Venue},
    geo::Coordinates,
    grade::{Grade, GradeClassifier},
    store::{AttendanceStore, GameFilter, SqliteStore},
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

fn store() -> SqliteStore {
    let store = SqliteStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn classifier() -> GradeClassifier {
    GradeClassifier::new(NaiveDate::from_ymd_opt(2025, 9, 13).unwrap())
}

/// Inside the week 2 window (19:00–22:00 UTC).
fn kickoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 13, 19, 30, 0).unwrap()
}

fn request(game_id: &str, user: &str, email: &str) -> CheckInRequest {
    CheckInRequest {
        game_id: game_id.into(),
        student: StudentIdentity {
            user_id: user.into(),
            email: email.into(),
        },
        location: None,
    }
}

#[test]
fn records_then_reports_duplicate() {
    let cfg = AppConfig::default_test();
    let store = store();
    let classifier = classifier();
    let service = CheckInService::new(&store, &cfg.catalog, &classifier);
    let req = request("week-2-vs-northridge", "u-1", "jdoe27@school.org");

    let first = service.check_in(&req, kickoff()).unwrap();
    assert_eq!(first, CheckInOutcome::Recorded { grade: Grade::Junior });

    let second = service.check_in(&req, kickoff()).unwrap();
    assert_eq!(second, CheckInOutcome::AlreadyCheckedIn);

    let rows = store
        .rows(&GameFilter::Game("week-2-vs-northridge".into()))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_grade.as_deref(), Some("Junior"));
    assert_eq!(rows[0].created_at, kickoff());
}

#[test]
fn unclassifiable_email_still_checks_in_as_other() {
    let cfg = AppConfig::default_test();
    let store = store();
    let classifier = classifier();
    let service = CheckInService::new(&store, &cfg.catalog, &classifier);

    let outcome = service
        .check_in(&request("week-2-vs-northridge", "coach", "coach.miller@school.org"), kickoff())
        .unwrap();
    assert_eq!(outcome, CheckInOutcome::Recorded { grade: Grade::Other });
}

#[test]
fn unknown_game_is_not_found() {
    let cfg = AppConfig::default_test();
    let store = store();
    let classifier = classifier();
    let service = CheckInService::new(&store, &cfg.catalog, &classifier);

    let err = service
        .check_in(&request("week-99", "u-1", "jdoe27@school.org"), kickoff())
        .unwrap_err();
    assert!(matches!(err, CheckinError::GameNotFound { .. }), "{err}");
}

#[test]
fn closed_window_is_rejected() {
    let cfg = AppConfig::default_test();
    let store = store();
    let classifier = classifier();
    let service = CheckInService::new(&store, &cfg.catalog, &classifier);
    let req = request("week-2-vs-northridge", "u-1", "jdoe27@school.org");

    let early = Utc.with_ymd_and_hms(2025, 9, 13, 18, 59, 59).unwrap();
    let late = Utc.with_ymd_and_hms(2025, 9, 13, 22, 0, 1).unwrap();
    for now in [early, late] {
        let err = service.check_in(&req, now).unwrap_err();
        assert!(matches!(err, CheckinError::WindowClosed { .. }), "{err}");
    }

    let at_close = Utc.with_ymd_and_hms(2025, 9, 13, 22, 0, 0).unwrap();
    assert!(service.check_in(&req, at_close).is_ok(), "window end is inclusive");
}

fn fenced_catalog() -> GameCatalog {
    GameCatalog::new(vec![GameConfig {
        id: "home-opener".into(),
        name: "Home Opener".into(),
        check_in_start: Utc.with_ymd_and_hms(2025, 9, 13, 19, 0, 0).unwrap(),
        check_in_end: Utc.with_ymd_and_hms(2025, 9, 13, 22, 0, 0).unwrap(),
        venue: Some(Venue {
            lat: 29.7604,
            lng: -95.3698,
            radius_miles: 1.0,
        }),
    }])
}

#[test]
fn venue_gating_requires_nearby_location() {
    let catalog = fenced_catalog();
    let store = store();
    let classifier = classifier();
    let service = CheckInService::new(&store, &catalog, &classifier);

    let mut req = request("home-opener", "u-1", "jdoe28@school.org");
    let err = service.check_in(&req, kickoff()).unwrap_err();
    assert!(matches!(err, CheckinError::LocationRequired { .. }), "{err}");

    req.location = Some(Coordinates { lat: 30.2672, lng: -97.7431 });
    let err = service.check_in(&req, kickoff()).unwrap_err();
    assert!(matches!(err, CheckinError::OutOfRange { .. }), "{err}");

    req.location = Some(Coordinates { lat: 29.7610, lng: -95.3700 });
    let outcome = service.check_in(&req, kickoff()).unwrap();
    assert_eq!(outcome, CheckInOutcome::Recorded { grade: Grade::Sophomore });
}
