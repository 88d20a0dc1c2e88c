use crate::{
    error::{CheckinError, CheckinResult},
    game::GameCatalog,
    grade::Grade,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_NOISE_AMPLITUDE: f64 = 0.12;
pub const DEFAULT_MAX_RATE: f64 = 0.95;
pub const DEFAULT_BIN_MINUTES: u32 = 10;
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_EMAIL_DOMAIN: &str = "school.test";

/// Population and sampling parameters for demo data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortConfig {
    /// Students per grade; the sampling universe.
    pub grade_sizes: BTreeMap<Grade, usize>,
    /// Baseline attendance rate per grade, before per-game noise.
    pub base_rates: BTreeMap<Grade, f64>,
    #[serde(default = "default_noise_amplitude")]
    pub noise_amplitude: f64,
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,
    #[serde(default = "default_bin_minutes")]
    pub bin_minutes: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_email_domain")]
    pub email_domain: String,
}

fn default_noise_amplitude() -> f64 {
    DEFAULT_NOISE_AMPLITUDE
}
fn default_max_rate() -> f64 {
    DEFAULT_MAX_RATE
}
fn default_bin_minutes() -> u32 {
    DEFAULT_BIN_MINUTES
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_email_domain() -> String {
    DEFAULT_EMAIL_DOMAIN.into()
}

impl CohortConfig {
    /// Baseline rate for a grade; grades without an override use the
    /// stock school-wide baseline.
    pub fn base_rate(&self, grade: Grade) -> f64 {
        self.base_rates
            .get(&grade)
            .copied()
            .unwrap_or_else(|| default_base_rate(grade))
    }

    pub fn total_students(&self) -> usize {
        Grade::CANONICAL
            .iter()
            .filter_map(|g| self.grade_sizes.get(g))
            .sum()
    }

    pub fn validate(&self) -> CheckinResult<()> {
        if !(0.0..=1.0).contains(&self.max_rate) {
            return Err(CheckinError::InvalidConfig(format!(
                "max_rate must be within [0, 1], got {}",
                self.max_rate
            )));
        }
        if !(self.noise_amplitude >= 0.0) {
            return Err(CheckinError::InvalidConfig(format!(
                "noise_amplitude must be non-negative, got {}",
                self.noise_amplitude
            )));
        }
        if let Some((grade, rate)) = self
            .base_rates
            .iter()
            .find(|(_, r)| !(0.0..=1.0).contains(*r))
        {
            return Err(CheckinError::InvalidConfig(format!(
                "base rate for {grade} must be within [0, 1], got {rate}"
            )));
        }
        if self.bin_minutes == 0 {
            return Err(CheckinError::InvalidConfig("bin_minutes must be > 0".into()));
        }
        if self.batch_size == 0 {
            return Err(CheckinError::InvalidConfig("batch_size must be > 0".into()));
        }
        Ok(())
    }
}

/// Stock per-grade baseline: upperclassmen show up a little more.
pub fn default_base_rate(grade: Grade) -> f64 {
    match grade {
        Grade::Senior => 0.38,
        Grade::Junior => 0.35,
        Grade::Sophomore => 0.32,
        Grade::Freshman => 0.30,
        Grade::Other => 0.0,
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog: GameCatalog,
    pub cohort: CohortConfig,
}

impl AppConfig {
    /// Load from the data/ directory.
    /// In tests, use AppConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let games_path = format!("{data_dir}/games.json");
        let games_content = std::fs::read_to_string(&games_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {games_path}: {e}"))?;
        let catalog: GameCatalog = serde_json::from_str(&games_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {games_path}: {e}"))?;

        let cohort_path = format!("{data_dir}/cohort.json");
        let cohort_content = std::fs::read_to_string(&cohort_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {cohort_path}: {e}"))?;
        let cohort: CohortConfig = serde_json::from_str(&cohort_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {cohort_path}: {e}"))?;

        catalog.validate()?;
        cohort.validate()?;

        log::info!(
            "loaded {} games and {} students from {data_dir}",
            catalog.games.len(),
            cohort.total_students()
        );
        Ok(Self { catalog, cohort })
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        use crate::game::GameConfig;
        use chrono::{TimeZone, Utc};

        let game = |id: &str, name: &str, day: u32, start_h: u32, end_h: u32| GameConfig {
            id: id.into(),
            name: name.into(),
            check_in_start: Utc.with_ymd_and_hms(2025, 9, day, start_h, 0, 0).unwrap(),
            check_in_end: Utc.with_ymd_and_hms(2025, 9, day, end_h, 0, 0).unwrap(),
            venue: None,
        };

        let catalog = GameCatalog::new(vec![
            game("week-3-vs-lakeview", "Week 3 vs. Lakeview High", 20, 18, 21),
            game("week-2-vs-northridge", "Week 2 vs. Northridge Academy", 13, 19, 22),
            game("homecoming-2025", "Homecoming 2025 vs. St. Marks", 27, 19, 21),
        ]);

        let grade_sizes = Grade::CANONICAL.iter().map(|g| (*g, 100)).collect();
        let base_rates = Grade::CANONICAL
            .iter()
            .map(|g| (*g, default_base_rate(*g)))
            .collect();

        Self {
            catalog,
            cohort: CohortConfig {
                grade_sizes,
                base_rates,
                noise_amplitude: DEFAULT_NOISE_AMPLITUDE,
                max_rate: DEFAULT_MAX_RATE,
                bin_minutes: DEFAULT_BIN_MINUTES,
                batch_size: DEFAULT_BATCH_SIZE,
                email_domain: DEFAULT_EMAIL_DOMAIN.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_test_config_is_valid() {
        let cfg = AppConfig::default_test();
        cfg.catalog.validate().unwrap();
        cfg.cohort.validate().unwrap();
        assert_eq!(cfg.cohort.total_students(), 400);
    }

    #[test]
    fn cohort_json_fills_defaults() {
        let json = r#"{
            "grade_sizes": { "Senior": 10, "Freshman": 5 },
            "base_rates": { "Senior": 0.5 }
        }"#;
        let cohort: CohortConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cohort.noise_amplitude, DEFAULT_NOISE_AMPLITUDE);
        assert_eq!(cohort.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(cohort.base_rate(Grade::Senior), 0.5);
        assert_eq!(cohort.base_rate(Grade::Junior), 0.35);
        assert_eq!(cohort.total_students(), 15);
    }

    #[test]
    fn zero_bin_width_is_rejected() {
        let mut cohort = AppConfig::default_test().cohort;
        cohort.bin_minutes = 0;
        assert!(matches!(
            cohort.validate(),
            Err(CheckinError::InvalidConfig(_))
        ));
    }
}
