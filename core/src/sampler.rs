//! Deterministic attendance sampling.
//!
//! SAMPLING ORDER (fixed, never reordered):
//!   Senior → Junior → Sophomore → Freshman
//!
//! For each grade, in that order, the per-game stream is consumed as:
//!   1. one draw for the rate noise (even when the grade is empty),
//!   2. Fisher–Yates swap draws over the grade's roster,
//!   3. one draw per picked student for the check-in timestamp.
//!
//! Changing any of the above changes every previously generated data set.

use crate::{
    config::{default_base_rate, CohortConfig, DEFAULT_MAX_RATE, DEFAULT_NOISE_AMPLITUDE},
    error::CheckinResult,
    event::AttendanceEvent,
    game::{GameConfig, GameWindow},
    grade::Grade,
    pool::{build_pool, StudentPool, StudentRecord},
    rng::{seeded, SeededRng},
};
use chrono::Duration;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct AttendanceSampler {
    pub noise_amplitude: f64,
    pub max_rate: f64,
    pub email_domain: String,
}

impl Default for AttendanceSampler {
    fn default() -> Self {
        Self {
            noise_amplitude: DEFAULT_NOISE_AMPLITUDE,
            max_rate: DEFAULT_MAX_RATE,
            email_domain: crate::config::DEFAULT_EMAIL_DOMAIN.into(),
        }
    }
}

impl AttendanceSampler {
    pub fn from_cohort(cohort: &CohortConfig) -> Self {
        Self {
            noise_amplitude: cohort.noise_amplitude,
            max_rate: cohort.max_rate,
            email_domain: cohort.email_domain.clone(),
        }
    }

    /// Generate the attendance events for one game.
    pub fn sample(
        &self,
        game_id: &str,
        window: &GameWindow,
        grade_sizes: &BTreeMap<Grade, usize>,
        base_rates: &BTreeMap<Grade, f64>,
    ) -> Vec<AttendanceEvent> {
        let pool = build_pool(grade_sizes, &self.email_domain);
        self.sample_from_pool(game_id, window, &pool, base_rates)
    }

    /// Sample a catalog game with the cohort's sizes and base rates.
    pub fn sample_game(
        &self,
        game: &GameConfig,
        cohort: &CohortConfig,
    ) -> CheckinResult<Vec<AttendanceEvent>> {
        let window = game.window()?;
        Ok(self.sample(&game.id, &window, &cohort.grade_sizes, &cohort.base_rates))
    }

    /// Same as `sample`, reusing a roster built once for many games.
    pub fn sample_from_pool(
        &self,
        game_id: &str,
        window: &GameWindow,
        pool: &StudentPool,
        base_rates: &BTreeMap<Grade, f64>,
    ) -> Vec<AttendanceEvent> {
        let mut rng = seeded(game_id);
        let mut events = Vec::new();

        for grade in Grade::CANONICAL {
            let roster: &[StudentRecord] = pool.get(&grade).map(Vec::as_slice).unwrap_or(&[]);
            let base = base_rates
                .get(&grade)
                .copied()
                .unwrap_or_else(|| default_base_rate(grade));

            let rate = self.effective_rate(base, &mut rng);
            let target = (roster.len() as f64 * rate).floor() as usize;

            let picks = sample_without_replacement(roster, target, &mut rng);
            for student in picks {
                events.push(AttendanceEvent {
                    timestamp: random_instant(window, &mut rng),
                    game_id: game_id.to_string(),
                    grade,
                    student_id: student.student_id.clone(),
                    student_email: student.email.clone(),
                });
            }
            log::debug!(
                "game={game_id} grade={grade}: rate={rate:.3} picked {target}/{}",
                roster.len()
            );
        }
        events
    }

    /// `clamp(base + amplitude * (rng - 0.5), 0, max_rate)`. A negative or
    /// NaN `max_rate` caps at zero.
    fn effective_rate(&self, base: f64, rng: &mut SeededRng) -> f64 {
        let noisy = base + self.noise_amplitude * (rng.next_f64() - 0.5);
        noisy.max(0.0).min(self.max_rate.max(0.0))
    }
}

/// Fisher–Yates over a copy of `items`, keeping the first `n`.
fn sample_without_replacement<'a, T>(items: &'a [T], n: usize, rng: &mut SeededRng) -> Vec<&'a T> {
    let mut shuffled: Vec<&T> = items.iter().collect();
    for i in (1..shuffled.len()).rev() {
        let j = rng.index_below(i + 1);
        shuffled.swap(i, j);
    }
    shuffled.truncate(n.min(items.len()));
    shuffled
}

/// Uniform instant in the window, truncated to whole milliseconds.
fn random_instant(window: &GameWindow, rng: &mut SeededRng) -> chrono::DateTime<chrono::Utc> {
    let span = (window.end_ms() - window.start_ms()) as f64;
    let offset = rng.between(0.0, span).floor() as i64;
    window.start() + Duration::milliseconds(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_without_replacement_has_no_duplicates() {
        let items: Vec<u32> = (0..50).collect();
        let mut rng = seeded("dupes");
        let picks = sample_without_replacement(&items, 30, &mut rng);
        let mut seen: Vec<u32> = picks.iter().map(|v| **v).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 30);
    }

    #[test]
    fn sample_larger_than_population_is_capped() {
        let items = [1, 2, 3];
        let picks = sample_without_replacement(&items, 10, &mut seeded("cap"));
        assert_eq!(picks.len(), 3);
    }

    #[test]
    fn rate_is_clamped() {
        let sampler = AttendanceSampler {
            noise_amplitude: 4.0,
            max_rate: 0.5,
            ..AttendanceSampler::default()
        };
        let mut rng = seeded("clamp");
        for _ in 0..200 {
            let r = sampler.effective_rate(0.9, &mut rng);
            assert!((0.0..=0.5).contains(&r), "rate {r}");
        }
    }

    #[test]
    fn negative_or_nan_max_rate_yields_zero() {
        for max_rate in [-0.1, f64::NAN] {
            let sampler = AttendanceSampler {
                max_rate,
                ..AttendanceSampler::default()
            };
            let mut rng = seeded("cap-below-zero");
            assert_eq!(sampler.effective_rate(0.4, &mut rng), 0.0, "max_rate {max_rate}");
        }
    }
}
