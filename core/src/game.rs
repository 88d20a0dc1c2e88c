//! Game catalog and check-in windows.

use crate::{
    error::{CheckinError, CheckinResult},
    geo::Coordinates,
    types::{GameId, Millis},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` interval during which check-ins are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl GameWindow {
    pub fn new(game_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CheckinResult<Self> {
        if start > end {
            return Err(CheckinError::InvalidWindow {
                game_id: game_id.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_ms(&self) -> Millis {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> Millis {
        self.end.timestamp_millis()
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Optional geofence around the stadium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub lat: f64,
    pub lng: f64,
    pub radius_miles: f64,
}

impl Venue {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub id: GameId,
    pub name: String,
    pub check_in_start: DateTime<Utc>,
    pub check_in_end: DateTime<Utc>,
    #[serde(default)]
    pub venue: Option<Venue>,
}

impl GameConfig {
    pub fn window(&self) -> CheckinResult<GameWindow> {
        GameWindow::new(&self.id, self.check_in_start, self.check_in_end)
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.check_in_end < now
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameCatalog {
    pub games: Vec<GameConfig>,
}

impl GameCatalog {
    pub fn new(games: Vec<GameConfig>) -> Self {
        Self { games }
    }

    /// Look up a game. An unknown id is an error; there is no default window.
    pub fn find(&self, game_id: &str) -> CheckinResult<&GameConfig> {
        self.games
            .iter()
            .find(|g| g.id == game_id)
            .ok_or_else(|| CheckinError::GameNotFound {
                game_id: game_id.to_string(),
            })
    }

    /// Games to seed: the explicit `ids` (or all when empty), restricted to
    /// games whose window has already closed unless `include_future`.
    pub fn select(
        &self,
        ids: &[String],
        include_future: bool,
        now: DateTime<Utc>,
    ) -> Vec<&GameConfig> {
        self.games
            .iter()
            .filter(|g| ids.is_empty() || ids.contains(&g.id))
            .filter(|g| include_future || g.has_ended(now))
            .collect()
    }

    /// Catalog order is authoring order; dashboards want oldest first.
    pub fn by_start(&self) -> Vec<&GameConfig> {
        let mut games: Vec<_> = self.games.iter().collect();
        games.sort_by_key(|g| g.check_in_start);
        games
    }

    /// Check every window up front so bad config fails at load time.
    pub fn validate(&self) -> CheckinResult<()> {
        for game in &self.games {
            game.window()?;
        }
        Ok(())
    }
}
