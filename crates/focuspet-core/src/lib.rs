//! # Focus Pet Core Library
//!
//! This library provides the core logic for Focus Pet, a focus/break interval
//! timer with a companion that grows as focus time accumulates. Front-ends
//! (the bundled CLI, or any renderer) are thin layers over the same engine.
//!
//! ## Architecture
//!
//! - **Session Engine**: A wall-clock-deadline state machine that requires the
//!   caller to periodically invoke `tick()`; awards points on completed focus
//!   intervals
//! - **Progress Store**: A single JSON record holding points, stage, mood and
//!   timestamps, normalized on load and rewritten after every mutation
//! - **Presentation Mapper**: Pure derivation of the scene key a renderer
//!   should display
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Session state machine, owner of the live [`Progress`]
//! - [`ProgressStore`]: Durable progress record
//! - [`scene_key`]: Scene selection
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod presentation;
pub mod progress;
pub mod session;
pub mod storage;

pub use error::{ConfigError, CoreError, StorageError};
pub use events::{Event, NextPhase};
pub use presentation::{is_neglected, scene_key, SceneInput, SceneKey, REST_FRAME_COUNT};
pub use progress::{grow_stage, GrowthThresholds, Mood, Progress, ProgressStore, Stage};
pub use session::{
    Phase, SessionConfig, SessionEngine, Severity, Snapshot, StatusMessage, MAX_INTERVAL_MINUTES,
    POINTS_PER_MINUTE,
};
pub use storage::Config;
