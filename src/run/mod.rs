pub mod points;
pub mod scoring;

pub use points::{fault_key, lifetime_points, speed_points, title_points, RunOutcome};
pub use scoring::{RunScoring, RunScoringType};
