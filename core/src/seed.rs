//! Demo-data seeding: sample every selected game and persist the rows in
//! bounded batches.
//!
//! A failed batch aborts the run and is reported with its index and store
//! error. Batches written before it stay written; with `attach_students`
//! the rows carry deterministic student ids and go through upsert, so the
//! whole run can simply be repeated.

use crate::{
    config::CohortConfig,
    error::{CheckinError, CheckinResult},
    event::AttendanceRow,
    game::GameCatalog,
    pool::build_pool,
    sampler::AttendanceSampler,
    store::AttendanceStore,
    types::GameId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Only compute what would be written.
    pub dry_run: bool,
    /// Delete every existing row first. Ignored in a dry run.
    pub reset: bool,
    /// Restrict to these game ids; empty means every catalog game.
    pub games: Vec<GameId>,
    /// Also seed games whose check-in window has not closed yet.
    pub include_future: bool,
    /// Write student ids/emails and dedupe on (user_id, game_id).
    pub attach_students: bool,
    pub now: DateTime<Utc>,
}

impl SeedOptions {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            dry_run: false,
            reset: false,
            games: Vec::new(),
            include_future: false,
            attach_students: false,
            now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSeedResult {
    pub game_id: GameId,
    pub to_insert: usize,
    /// `None` in a dry run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub reset: bool,
    pub dry_run: bool,
    pub attach_students: bool,
    /// Rows removed by the reset, if one ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared: Option<usize>,
    pub games: Vec<GameSeedResult>,
}

impl SeedReport {
    pub fn total_inserted(&self) -> usize {
        self.games.iter().filter_map(|g| g.inserted).sum()
    }
}

pub struct Seeder<'a> {
    catalog: &'a GameCatalog,
    cohort: &'a CohortConfig,
    sampler: AttendanceSampler,
}

impl<'a> Seeder<'a> {
    pub fn new(catalog: &'a GameCatalog, cohort: &'a CohortConfig) -> Self {
        Self {
            catalog,
            cohort,
            sampler: AttendanceSampler::from_cohort(cohort),
        }
    }

    pub fn run<S: AttendanceStore + ?Sized>(
        &self,
        store: &S,
        opts: &SeedOptions,
    ) -> CheckinResult<SeedReport> {
        self.cohort.validate()?;
        for id in &opts.games {
            self.catalog.find(id)?;
        }
        let games = self
            .catalog
            .select(&opts.games, opts.include_future, opts.now);

        let cleared = if opts.reset && !opts.dry_run {
            let n = store.clear()?;
            log::info!("seed: reset removed {n} rows");
            Some(n)
        } else {
            None
        };

        let pool = build_pool(&self.cohort.grade_sizes, &self.cohort.email_domain);
        let mut results = Vec::with_capacity(games.len());

        for game in games {
            let window = game.window()?;
            let rows: Vec<AttendanceRow> = self
                .sampler
                .sample_from_pool(&game.id, &window, &pool, &self.cohort.base_rates)
                .iter()
                .map(|e| e.to_row(opts.attach_students))
                .collect();

            let inserted = if opts.dry_run {
                None
            } else {
                Some(self.write_game(store, &game.id, &rows, opts.attach_students)?)
            };

            log::info!(
                "seed: game={} to_insert={} inserted={:?}",
                game.id,
                rows.len(),
                inserted
            );
            results.push(GameSeedResult {
                game_id: game.id.clone(),
                to_insert: rows.len(),
                inserted,
            });
        }

        Ok(SeedReport {
            reset: opts.reset,
            dry_run: opts.dry_run,
            attach_students: opts.attach_students,
            cleared,
            games: results,
        })
    }

    fn write_game<S: AttendanceStore + ?Sized>(
        &self,
        store: &S,
        game_id: &str,
        rows: &[AttendanceRow],
        upsert: bool,
    ) -> CheckinResult<usize> {
        let mut inserted = 0;
        for (batch, chunk) in rows.chunks(self.cohort.batch_size).enumerate() {
            let written = if upsert {
                store.upsert_batch(chunk)
            } else {
                store.insert_batch(chunk)
            };
            match written {
                Ok(n) => inserted += n,
                Err(e) => {
                    log::warn!("seed: game={game_id} batch {batch} failed: {e}");
                    return Err(CheckinError::BatchFailed {
                        game_id: game_id.to_string(),
                        batch,
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(inserted)
    }
}
