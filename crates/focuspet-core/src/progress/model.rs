use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Companion growth level. Ordered: `Baby < Teen < Adult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Baby,
    Teen,
    Adult,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Baby, Stage::Teen, Stage::Adult];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Baby => "baby",
            Stage::Teen => "teen",
            Stage::Adult => "adult",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

/// Companion mood.
///
/// Some older records use a two-value `normal | sad` scheme; `normal` reads
/// as [`Mood::Neutral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Sad,
    Neutral,
    Happy,
}

impl Mood {
    pub const ALL: [Mood; 3] = [Mood::Sad, Mood::Neutral, Mood::Happy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Sad => "sad",
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(Mood::Neutral),
            other => Self::ALL.into_iter().find(|m| m.as_str() == other),
        }
    }
}

/// The durable companion record.
///
/// `total` and `stage` never decrease over the record's lifetime; only the
/// session engine mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Accumulated points.
    pub total: f64,
    pub stage: Stage,
    pub mood: Mood,
    /// When the last focus interval completed.
    pub last_session: Option<DateTime<Utc>>,
    /// Last recorded user interaction.
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            total: 0.0,
            stage: Stage::Baby,
            mood: Mood::Sad,
            last_session: None,
            last_active: None,
        }
    }
}
