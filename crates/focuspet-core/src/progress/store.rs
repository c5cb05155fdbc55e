//! JSON-backed progress record.
//!
//! The record lives at `<data dir>/progress.json`. Loading never fails: a
//! missing, empty, or corrupt file yields defaults, each field is validated on
//! its own, and the normalized record is written straight back.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::model::{Mood, Progress, Stage};
use crate::error::StorageError;
use crate::storage::data_dir;

const RECORD_FILE: &str = "progress.json";

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Durable single-record store for [`Progress`].
///
/// Assumes a single writer: only the session engine that owns the store saves
/// through it.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    /// Store at the default location inside [`data_dir`].
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self::with_path(data_dir()?.join(RECORD_FILE)))
    }

    /// Store inside a specific directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::with_path(dir.join(RECORD_FILE))
    }

    /// Store at a specific file path (for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and normalize the record, then rewrite it.
    pub fn load(&self) -> Progress {
        let progress = match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no progress record yet, using defaults");
                Progress::default()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read progress record, using defaults");
                Progress::default()
            }
        };

        if let Err(e) = self.save(&progress) {
            tracing::warn!(error = %e, "could not rewrite normalized progress record");
        }
        progress
    }

    /// Serialize the full record and replace the previous one.
    ///
    /// Writes a sibling temp file and renames it over the target so a later
    /// `load` sees either the old record or the new one, never a torn write.
    pub fn save(&self, progress: &Progress) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(progress)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        self.atomic_write(content.as_bytes())
            .map_err(|source| StorageError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), total = progress.total, "progress saved");
        Ok(())
    }

    fn atomic_write(&self, content: &[u8]) -> io::Result<()> {
        let temp_path = self.path.with_extension("tmp");

        let mut file = File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)
    }
}

/// Parse raw record text, falling back to defaults when it is not a JSON object.
pub fn decode(raw: &str) -> Progress {
    if raw.trim().is_empty() {
        return Progress::default();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => normalize(&value),
        Err(e) => {
            tracing::warn!(error = %e, "corrupt progress record, using defaults");
            Progress::default()
        }
    }
}

/// Validate each field of a decoded record independently.
///
/// Unknown fields are ignored; missing or invalid ones take their default.
pub fn normalize(value: &Value) -> Progress {
    let Some(obj) = value.as_object() else {
        tracing::warn!("progress record is not an object, using defaults");
        return Progress::default();
    };
    let defaults = Progress::default();

    let total = obj
        .get("total")
        .and_then(coerce_points)
        .unwrap_or(defaults.total);

    let stage = obj
        .get("stage")
        .or_else(|| obj.get("level"))
        .and_then(Value::as_str)
        .and_then(Stage::from_name)
        .unwrap_or(defaults.stage);

    let mood = obj
        .get("mood")
        .and_then(Value::as_str)
        .and_then(Mood::from_name)
        .unwrap_or(defaults.mood);

    let last_session = obj.get("last_session").and_then(parse_timestamp);
    let last_active = obj
        .get("last_active")
        .and_then(parse_timestamp)
        .or_else(|| obj.get("last_login").and_then(parse_timestamp));

    Progress {
        total,
        stage,
        mood,
        last_session,
        last_active,
    }
}

fn coerce_points(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then_some(n)
}

/// Accepts RFC 3339, offset-less ISO-8601 (read as UTC), or epoch seconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => {
            let secs = n.as_f64()?;
            if !secs.is_finite() {
                return None;
            }
            let whole = secs.floor();
            let nanos = ((secs - whole) * 1e9) as u32;
            DateTime::<Utc>::from_timestamp(whole as i64, nanos)
        }
        _ => None,
    }
}
