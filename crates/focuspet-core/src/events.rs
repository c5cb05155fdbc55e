use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progress::Stage;

/// Where a run goes after a completed focus interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextPhase {
    Break,
    Finished,
}

/// Every state change in the engine produces an Event.
/// Front-ends print or forward them; illegal commands produce none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        run_id: Uuid,
        cycle: u32,
        total_cycles: u32,
        focus_minutes: f64,
        break_minutes: f64,
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Run aborted; the remaining time is for display only.
    SessionPaused {
        run_id: Uuid,
        cycle: u32,
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    SessionStopped {
        run_id: Uuid,
        at: DateTime<Utc>,
    },
    /// Focus deadline reached and points awarded.
    FocusCompleted {
        run_id: Uuid,
        cycle: u32,
        gained: f64,
        total_points: f64,
        stage: Stage,
        stage_advanced: bool,
        next: NextPhase,
        at: DateTime<Utc>,
    },
    /// Break deadline reached; `cycle` is the focus interval now starting.
    BreakCompleted {
        run_id: Uuid,
        cycle: u32,
        at: DateTime<Utc>,
    },
    /// Idle neglect written through to the stored mood.
    NeglectCommitted {
        idle_secs: i64,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_snake_case() {
        let event = Event::SessionStopped {
            run_id: Uuid::nil(),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "session_stopped");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn next_phase_is_lowercase() {
        assert_eq!(
            serde_json::to_value(NextPhase::Finished).unwrap(),
            serde_json::json!("finished")
        );
    }
}
