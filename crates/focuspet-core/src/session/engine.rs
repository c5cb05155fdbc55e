//! Session engine implementation.
//!
//! The session engine is a wall-clock-deadline state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` periodically
//! (100-250 ms works well) and passes the current time into every call.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Focusing --deadline--> Break --deadline--> Focusing ...
//! Focusing --deadline, last cycle--> Idle
//! Focusing | Break --pause/stop--> Idle
//! ```
//!
//! Both edges out of `Focusing` on a deadline award points. `pause` and `stop`
//! are full aborts: nothing is awarded and the next `start` begins at cycle 1.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(store, &config, Utc::now());
//! engine.start(SessionConfig::new(25.0, 3, 5.0), Utc::now());
//! // In a loop:
//! engine.tick(Utc::now()); // Returns Some(Event) on a phase boundary
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::SessionConfig;
use super::status::StatusMessage;
use crate::events::{Event, NextPhase};
use crate::presentation::{self, SceneInput, SceneKey, REST_FRAME_COUNT};
use crate::progress::{grow_stage, GrowthThresholds, Mood, Progress, ProgressStore, Stage};
use crate::storage::{Config, SessionDefaults};

/// Points awarded per completed focus minute.
pub const POINTS_PER_MINUTE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Focusing,
    Break,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub remaining_secs: f64,
    pub current_cycle: u32,
    pub total_cycles: u32,
    pub points: f64,
    pub stage: Stage,
    pub mood: Mood,
    pub status: StatusMessage,
    pub scene_key: SceneKey,
    pub at: DateTime<Utc>,
}

/// Core session engine.
///
/// Owns the live [`Progress`] and the store it is written through. Every
/// mutation of either happens inside one of the command methods or `tick`.
#[derive(Debug)]
pub struct SessionEngine {
    store: ProgressStore,
    progress: Progress,
    thresholds: GrowthThresholds,
    defaults: SessionDefaults,
    neglect_threshold: Duration,

    config: SessionConfig,
    phase: Phase,
    /// Present iff `phase != Idle`.
    deadline: Option<DateTime<Utc>>,
    current_cycle: u32,
    run_id: Option<Uuid>,
    /// Remaining time shown while idle (frozen by `pause`).
    idle_remaining_secs: f64,

    last_active_at: DateTime<Utc>,
    rest_cursor: usize,
    status: StatusMessage,
}

impl SessionEngine {
    /// Load progress from `store` and start in `Idle`.
    ///
    /// Neglect is measured from the last activity the record remembers, or
    /// from `now` for a record that has none.
    pub fn new(store: ProgressStore, settings: &Config, now: DateTime<Utc>) -> Self {
        let progress = store.load();
        let last_active_at = progress.last_active.unwrap_or(now);
        tracing::info!(
            total = progress.total,
            stage = progress.stage.as_str(),
            mood = progress.mood.as_str(),
            "progress loaded"
        );
        Self {
            store,
            progress,
            thresholds: settings.growth,
            defaults: settings.session.clone(),
            neglect_threshold: settings.companion.neglect_threshold(),
            config: SessionConfig::from_defaults(&settings.session),
            phase: Phase::Idle,
            deadline: None,
            current_cycle: 0,
            run_id: None,
            idle_remaining_secs: 0.0,
            last_active_at,
            rest_cursor: 0,
            status: StatusMessage::info("Press START to begin your first session"),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn current_cycle(&self) -> u32 {
        self.current_cycle
    }

    pub fn total_cycles(&self) -> u32 {
        self.config.total_cycles
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Seconds left in the current phase; the frozen display value when idle.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> f64 {
        match self.deadline {
            Some(deadline) => {
                let ms = deadline.signed_duration_since(now).num_milliseconds();
                (ms.max(0) as f64) / 1000.0
            }
            None => self.idle_remaining_secs,
        }
    }

    pub fn is_neglected(&self, now: DateTime<Utc>) -> bool {
        presentation::is_neglected(self.last_active_at, now, self.neglect_threshold)
    }

    /// Scene for `now` without advancing the rest animation.
    pub fn scene_key(&self, now: DateTime<Utc>) -> SceneKey {
        presentation::scene_key(&SceneInput {
            stage: self.progress.stage,
            mood: self.progress.mood,
            phase: self.phase,
            neglected: self.is_neglected(now),
            rest_cursor: self.rest_cursor,
        })
    }

    /// Build a full state snapshot.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Snapshot {
        Snapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs(now),
            current_cycle: self.current_cycle,
            total_cycles: self.config.total_cycles,
            points: self.progress.total,
            stage: self.progress.stage,
            mood: self.progress.mood,
            status: self.status.clone(),
            scene_key: self.scene_key(now),
            at: now,
        }
    }

    /// Snapshot for a rendered frame; steps the rest animation when it is shown.
    pub fn frame(&mut self, now: DateTime<Utc>) -> Snapshot {
        let snapshot = self.snapshot(now);
        if snapshot.scene_key.is_rest() {
            self.rest_cursor = (self.rest_cursor + 1) % REST_FRAME_COUNT;
        }
        snapshot
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record user interaction for neglect tracking.
    pub fn mark_active(&mut self, now: DateTime<Utc>) {
        if now > self.last_active_at {
            self.last_active_at = now;
        }
    }

    /// Begin a run at cycle 1. Legal from `Idle` or `Break`.
    ///
    /// `config` is adopted only from `Idle`; from `Break` the running config
    /// is kept and the run restarts at cycle 1 with no partial credit.
    pub fn start(&mut self, config: SessionConfig, now: DateTime<Utc>) -> Option<Event> {
        match self.phase {
            Phase::Idle => {
                self.config = config.sanitized(&self.defaults);
                self.run_id = Some(Uuid::new_v4());
            }
            Phase::Break => {}
            Phase::Focusing => return None,
        }
        let run_id = *self.run_id.get_or_insert_with(Uuid::new_v4);

        self.mark_active(now);
        self.current_cycle = 1;
        self.phase = Phase::Focusing;
        let deadline = deadline_after(now, self.config.focus_duration());
        self.deadline = Some(deadline);
        self.idle_remaining_secs = 0.0;
        self.status = StatusMessage::info(format!(
            "Session {}/{} started!",
            self.current_cycle, self.config.total_cycles
        ));

        if self.progress.mood == Mood::Sad {
            self.progress.mood = Mood::Neutral;
            self.persist();
        }

        tracing::info!(
            %run_id,
            focus_minutes = self.config.focus_minutes,
            break_minutes = self.config.break_minutes,
            total_cycles = self.config.total_cycles,
            "session started"
        );
        Some(Event::SessionStarted {
            run_id,
            cycle: self.current_cycle,
            total_cycles: self.config.total_cycles,
            focus_minutes: self.config.focus_minutes,
            break_minutes: self.config.break_minutes,
            deadline,
            at: now,
        })
    }

    /// Abort the run, keeping the remaining time for display. No points.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let run_id = self.abort(now)?;
        let remaining = self.idle_remaining_secs;
        self.status = StatusMessage::warning("Paused. Press START to resume.");
        tracing::info!(%run_id, remaining_secs = remaining, "session paused");
        Some(Event::SessionPaused {
            run_id,
            cycle: self.current_cycle,
            remaining_secs: remaining,
            at: now,
        })
    }

    /// Abort the run and reset the cycle counter. No points.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let run_id = self.abort(now)?;
        self.current_cycle = 0;
        self.idle_remaining_secs = 0.0;
        self.status = StatusMessage::error("Session cancelled - no points added.");
        tracing::info!(%run_id, "session stopped");
        Some(Event::SessionStopped { run_id, at: now })
    }

    /// Call periodically. Returns `Some(Event)` when a phase deadline is crossed.
    ///
    /// At most one boundary is applied per call; the next deadline is measured
    /// from `now`, so a late tick never fires twice.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        match self.phase {
            Phase::Focusing => Some(self.complete_focus(now)),
            Phase::Break => Some(self.complete_break(now)),
            Phase::Idle => None,
        }
    }

    /// Write the neglect override through to the stored mood.
    ///
    /// No-op unless the companion is neglected and not already sad.
    pub fn commit_neglect(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.is_neglected(now) || self.progress.mood == Mood::Sad {
            return None;
        }
        self.progress.mood = Mood::Sad;
        self.persist();
        let idle_secs = now.signed_duration_since(self.last_active_at).num_seconds();
        tracing::info!(idle_secs, "neglect committed");
        Some(Event::NeglectCommitted { idle_secs, at: now })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Shared abort path for `pause` and `stop`. Returns the aborted run id.
    fn abort(&mut self, now: DateTime<Utc>) -> Option<Uuid> {
        if self.phase == Phase::Idle {
            return None;
        }
        self.idle_remaining_secs = self.remaining_secs(now);
        self.mark_active(now);
        self.phase = Phase::Idle;
        self.deadline = None;
        self.progress.mood = Mood::Sad;
        self.persist();
        Some(self.run_id.take().unwrap_or_else(Uuid::nil))
    }

    fn complete_focus(&mut self, now: DateTime<Utc>) -> Event {
        let run_id = self.run_id.unwrap_or_else(Uuid::nil);
        let cycle = self.current_cycle;
        let gained = self.config.focus_minutes * POINTS_PER_MINUTE;

        self.progress.total += gained;
        self.progress.last_session = Some(now);
        let before = self.progress.stage;
        self.progress = grow_stage(&self.progress, &self.thresholds);
        let stage_advanced = self.progress.stage != before;
        self.progress.mood = Mood::Happy;
        self.persist();

        if stage_advanced {
            tracing::info!(
                from = before.as_str(),
                to = self.progress.stage.as_str(),
                total = self.progress.total,
                "companion grew"
            );
        }

        let next = if cycle < self.config.total_cycles {
            self.phase = Phase::Break;
            self.deadline = Some(deadline_after(now, self.config.break_duration()));
            self.status = StatusMessage::success(format!(
                "Session {cycle} finished (+{gained:.1}). Break {} min",
                self.config.break_minutes
            ));
            NextPhase::Break
        } else {
            self.phase = Phase::Idle;
            self.deadline = None;
            self.current_cycle = 0;
            self.idle_remaining_secs = 0.0;
            self.run_id = None;
            self.status = StatusMessage::success(format!(
                "All {} sessions done! (+{gained:.1})",
                self.config.total_cycles
            ));
            NextPhase::Finished
        };

        tracing::info!(%run_id, cycle, gained, total = self.progress.total, ?next, "focus completed");
        Event::FocusCompleted {
            run_id,
            cycle,
            gained,
            total_points: self.progress.total,
            stage: self.progress.stage,
            stage_advanced,
            next,
            at: now,
        }
    }

    fn complete_break(&mut self, now: DateTime<Utc>) -> Event {
        let run_id = self.run_id.unwrap_or_else(Uuid::nil);
        self.current_cycle = (self.current_cycle + 1).min(self.config.total_cycles);
        self.phase = Phase::Focusing;
        self.deadline = Some(deadline_after(now, self.config.focus_duration()));
        self.progress.mood = Mood::Neutral;
        self.persist();
        self.status = StatusMessage::info(format!(
            "Session {}/{} started!",
            self.current_cycle, self.config.total_cycles
        ));

        tracing::info!(%run_id, cycle = self.current_cycle, "break completed");
        Event::BreakCompleted {
            run_id,
            cycle: self.current_cycle,
            at: now,
        }
    }

    /// Write-through. A failed write is logged and the in-memory state stays
    /// authoritative.
    fn persist(&mut self) {
        self.progress.last_active = Some(self.last_active_at);
        if let Err(e) = self.store.save(&self.progress) {
            tracing::warn!(error = %e, "progress not saved; continuing with in-memory state");
        }
    }
}

/// `now + length`, saturating at the latest representable instant.
fn deadline_after(now: DateTime<Utc>, length: Duration) -> DateTime<Utc> {
    now.checked_add_signed(length).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
