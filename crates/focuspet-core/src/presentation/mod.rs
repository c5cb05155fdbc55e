//! Scene selection for renderers.
//!
//! Pure functions only: the caller owns every input, including the
//! rest-animation cursor, and nothing here touches [`Progress`].
//!
//! Priority, highest first:
//!
//! ```text
//! neglected                 -> <stage>_sad
//! phase = Break, Adult      -> adult_rest<n>   (cycling)
//! otherwise                 -> <stage>_<mood>
//! ```
//!
//! [`Progress`]: crate::progress::Progress

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

use crate::progress::{Mood, Stage};
use crate::session::Phase;

/// Frames in the adult rest animation.
pub const REST_FRAME_COUNT: usize = 3;

/// Identifier of what the renderer should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum SceneKey {
    /// Static scene, rendered as `<stage>_<mood>`.
    Mood { stage: Stage, mood: Mood },
    /// Adult rest animation frame, 0-based; rendered 1-based as `adult_rest<n>`.
    Rest { frame: usize },
}

impl SceneKey {
    pub fn is_rest(&self) -> bool {
        matches!(self, SceneKey::Rest { .. })
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneKey::Mood { stage, mood } => write!(f, "{}_{}", stage.as_str(), mood.as_str()),
            SceneKey::Rest { frame } => write!(f, "adult_rest{}", frame + 1),
        }
    }
}

impl From<SceneKey> for String {
    fn from(key: SceneKey) -> Self {
        key.to_string()
    }
}

/// Everything the mapper looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneInput {
    pub stage: Stage,
    pub mood: Mood,
    pub phase: Phase,
    pub neglected: bool,
    /// Monotonic rest-animation position; wrapped here.
    pub rest_cursor: usize,
}

pub fn scene_key(input: &SceneInput) -> SceneKey {
    if input.neglected {
        return SceneKey::Mood {
            stage: input.stage,
            mood: Mood::Sad,
        };
    }
    if input.phase == Phase::Break && input.stage == Stage::Adult {
        return SceneKey::Rest {
            frame: input.rest_cursor % REST_FRAME_COUNT,
        };
    }
    SceneKey::Mood {
        stage: input.stage,
        mood: input.mood,
    }
}

/// True once strictly more than `threshold` has passed since `last_active`.
pub fn is_neglected(last_active: DateTime<Utc>, now: DateTime<Utc>, threshold: Duration) -> bool {
    now.signed_duration_since(last_active) > threshold
}
