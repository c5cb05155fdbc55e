//! Stage growth rules.

use serde::{Deserialize, Serialize};

use super::model::{Progress, Stage};

/// Point thresholds at which the companion grows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthThresholds {
    /// Points needed for `Baby -> Teen`.
    #[serde(default = "default_baby_threshold")]
    pub baby_threshold: f64,
    /// Points needed for `Teen -> Adult`.
    #[serde(default = "default_teen_threshold")]
    pub teen_threshold: f64,
}

fn default_baby_threshold() -> f64 {
    180.0
}
fn default_teen_threshold() -> f64 {
    360.0
}

impl Default for GrowthThresholds {
    fn default() -> Self {
        Self {
            baby_threshold: default_baby_threshold(),
            teen_threshold: default_teen_threshold(),
        }
    }
}

impl GrowthThresholds {
    /// Highest stage `total` qualifies for on its own.
    fn stage_for(&self, total: f64) -> Stage {
        if total >= self.baby_threshold && total >= self.teen_threshold {
            Stage::Adult
        } else if total >= self.baby_threshold {
            Stage::Teen
        } else {
            Stage::Baby
        }
    }
}

/// Returns `progress` with its stage advanced as far as its points allow.
///
/// Pure. `Adult` is absorbing and the stage never moves backwards, even if
/// the thresholds were raised after the companion grew.
pub fn grow_stage(progress: &Progress, thresholds: &GrowthThresholds) -> Progress {
    let earned = thresholds.stage_for(progress.total);
    Progress {
        stage: progress.stage.max(earned),
        ..progress.clone()
    }
}
