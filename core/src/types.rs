//! Shared primitive types used across the check-in core.

/// Milliseconds since the Unix epoch. All window and bin arithmetic
/// happens at this resolution.
pub type Millis = i64;

/// The catalog identifier of a game, e.g. `homecoming-2025`.
pub type GameId = String;

/// A stable, unique identifier for a student.
pub type StudentId = String;
