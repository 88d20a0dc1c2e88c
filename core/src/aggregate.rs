//! Dashboard aggregation: grade totals, time-bucketed series, per-game
//! overview. Pure functions over anything implementing `Attendance`.

use crate::{
    error::{CheckinError, CheckinResult},
    event::{Attendance, AttendanceRow},
    game::GameCatalog,
    grade::Grade,
    types::{GameId, Millis},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

const MS_PER_MINUTE: Millis = 60_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GradeCounts {
    pub senior: u64,
    pub junior: u64,
    pub sophomore: u64,
    pub freshman: u64,
}

impl GradeCounts {
    pub fn get(&self, grade: Grade) -> u64 {
        match grade {
            Grade::Senior => self.senior,
            Grade::Junior => self.junior,
            Grade::Sophomore => self.sophomore,
            Grade::Freshman => self.freshman,
            Grade::Other => 0,
        }
    }

    /// Count one attendee. `Other` is silently dropped.
    pub fn increment(&mut self, grade: Grade) {
        match grade {
            Grade::Senior => self.senior += 1,
            Grade::Junior => self.junior += 1,
            Grade::Sophomore => self.sophomore += 1,
            Grade::Freshman => self.freshman += 1,
            Grade::Other => {}
        }
    }

    pub fn total(&self) -> u64 {
        self.senior + self.junior + self.sophomore + self.freshman
    }

    fn add(&mut self, other: &GradeCounts) {
        self.senior += other.senior;
        self.junior += other.junior;
        self.sophomore += other.sophomore;
        self.freshman += other.freshman;
    }

    /// Share of the grade's cohort that checked in, in percent.
    pub fn turnout_percent(&self, grade: Grade, grade_sizes: &BTreeMap<Grade, usize>) -> f64 {
        match grade_sizes.get(&grade).copied().unwrap_or(0) {
            0 => 0.0,
            size => self.get(grade) as f64 / size as f64 * 100.0,
        }
    }

    /// Share of the whole cohort that checked in, in percent.
    pub fn overall_turnout_percent(&self, total_students: usize) -> f64 {
        match total_students {
            0 => 0.0,
            n => self.total() as f64 / n as f64 * 100.0,
        }
    }

    /// Grades sorted by count, highest first; ties keep grade order.
    pub fn ranked(&self) -> Vec<(Grade, u64)> {
        let mut ranked: Vec<_> = Grade::CANONICAL.iter().map(|g| (*g, self.get(*g))).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

pub fn counts_by_grade<A: Attendance>(events: &[A]) -> GradeCounts {
    let mut counts = GradeCounts::default();
    for grade in events.iter().filter_map(Attendance::canonical_grade) {
        counts.increment(grade);
    }
    counts
}

/// One fixed-width bucket of the attendance time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesBin {
    pub start: DateTime<Utc>,
    /// `HH:MM` (UTC). Presentation only; ordering comes from `start`.
    pub label: String,
    pub counts: GradeCounts,
}

/// Per-interval counts in `bin_minutes` buckets spanning the events.
///
/// Bins run from the floor of the earliest event to the ceiling of the
/// latest, both inclusive. An empty input yields no bins.
pub fn time_series<A: Attendance>(events: &[A], bin_minutes: u32) -> CheckinResult<Vec<TimeSeriesBin>> {
    if bin_minutes == 0 {
        return Err(CheckinError::InvalidConfig("bin_minutes must be > 0".into()));
    }
    let width = bin_minutes as Millis * MS_PER_MINUTE;

    let times = events.iter().map(Attendance::checked_in_ms);
    let (Some(min), Some(max)) = (times.clone().min(), times.max()) else {
        return Ok(Vec::new());
    };
    let start = min.div_euclid(width) * width;
    let end = -(-max).div_euclid(width) * width;

    let mut bins = Vec::with_capacity(((end - start) / width + 1) as usize);
    let mut t = start;
    while t <= end {
        let bin_start = DateTime::from_timestamp_millis(t).ok_or_else(|| {
            CheckinError::Other(anyhow::anyhow!("bin start {t}ms is out of range"))
        })?;
        bins.push(TimeSeriesBin {
            start: bin_start,
            label: bin_start.format("%H:%M").to_string(),
            counts: GradeCounts::default(),
        });
        t += width;
    }

    for event in events {
        let Some(grade) = event.canonical_grade() else {
            continue;
        };
        let idx = (event.checked_in_ms().div_euclid(width) * width - start) / width;
        bins[idx as usize].counts.increment(grade);
    }
    Ok(bins)
}

/// Running totals: each bin holds everything checked in up to its end.
pub fn cumulative(bins: &[TimeSeriesBin]) -> Vec<TimeSeriesBin> {
    let mut running = GradeCounts::default();
    bins.iter()
        .map(|bin| {
            running.add(&bin.counts);
            TimeSeriesBin {
                counts: running,
                ..bin.clone()
            }
        })
        .collect()
}

/// One card on the admin overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: GameId,
    pub name: String,
    pub check_in_start: DateTime<Utc>,
    /// Every row for the game, including unclassified attendees.
    pub total: u64,
    /// Chartable grades only.
    pub breakdown: GradeCounts,
}

/// Per-game totals for every catalog game, oldest game first. Rows for
/// games not in the catalog are ignored.
pub fn summarize_games(catalog: &GameCatalog, rows: &[AttendanceRow]) -> Vec<GameSummary> {
    let mut by_game: HashMap<&str, Vec<&AttendanceRow>> = HashMap::new();
    for row in rows {
        by_game.entry(row.game_id.as_str()).or_default().push(row);
    }

    catalog
        .by_start()
        .into_iter()
        .map(|game| {
            let game_rows = by_game.get(game.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let mut breakdown = GradeCounts::default();
            for grade in game_rows.iter().filter_map(|r| r.canonical_grade()) {
                breakdown.increment(grade);
            }
            GameSummary {
                game_id: game.id.clone(),
                name: game.name.clone(),
                check_in_start: game.check_in_start,
                total: game_rows.len() as u64,
                breakdown,
            }
        })
        .collect()
}
