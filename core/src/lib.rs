//! Game-day check-in core: deterministic demo attendance, grade
//! classification, dashboard aggregation, and attendance persistence.

pub mod aggregate;
pub mod checkin;
pub mod config;
pub mod error;
pub mod event;
pub mod game;
pub mod geo;
pub mod grade;
pub mod pool;
pub mod rng;
pub mod sampler;
pub mod seed;
pub mod store;
pub mod types;
