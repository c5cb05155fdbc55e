mod config;
mod engine;
mod status;

pub(crate) use config::duration_from_minutes;
pub use config::{SessionConfig, MAX_INTERVAL_MINUTES};
pub use engine::{Phase, SessionEngine, Snapshot, POINTS_PER_MINUTE};
pub use status::{Severity, StatusMessage};
