mod growth;
mod model;
mod store;

pub use growth::{grow_stage, GrowthThresholds};
pub use model::{Mood, Progress, Stage};
pub use store::{decode, normalize, ProgressStore};
