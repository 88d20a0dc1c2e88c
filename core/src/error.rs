use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckinError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Game '{game_id}' not found")]
    GameNotFound { game_id: String },

    #[error("Invalid check-in window for game '{game_id}': start is after end")]
    InvalidWindow { game_id: String },

    #[error("Check-in window for game '{game_id}' is not open")]
    WindowClosed { game_id: String },

    #[error("Game '{game_id}' requires a location to check in")]
    LocationRequired { game_id: String },

    #[error("Too far from the venue for game '{game_id}': {distance_miles:.2} miles")]
    OutOfRange { game_id: String, distance_miles: f64 },

    #[error("Attendance already recorded for game '{game_id}'")]
    AlreadyRecorded { game_id: String },

    #[error("Insert failed for game '{game_id}' at batch {batch}: {source}")]
    BatchFailed {
        game_id: String,
        batch: usize,
        #[source]
        source: Box<CheckinError>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CheckinResult<T> = Result<T, CheckinError>;
