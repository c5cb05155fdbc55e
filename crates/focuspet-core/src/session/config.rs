use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::storage::SessionDefaults;

/// Longest accepted focus or break interval (one week).
pub const MAX_INTERVAL_MINUTES: f64 = 7.0 * 24.0 * 60.0;

/// Interval lengths for one run. Fixed once the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Focus interval length, strictly positive.
    pub focus_minutes: f64,
    /// Break length, may be zero.
    pub break_minutes: f64,
    /// Focus intervals per run, at least one.
    pub total_cycles: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_defaults(&SessionDefaults::default())
    }
}

impl SessionConfig {
    /// Build a config, replacing each invalid field with the built-in default.
    pub fn new(focus_minutes: f64, total_cycles: u32, break_minutes: f64) -> Self {
        Self {
            focus_minutes,
            break_minutes,
            total_cycles,
        }
        .sanitized(&SessionDefaults::default())
    }

    pub fn from_defaults(defaults: &SessionDefaults) -> Self {
        let builtin = SessionDefaults::default();
        Self {
            focus_minutes: valid_focus(defaults.focus_minutes).unwrap_or(builtin.focus_minutes),
            break_minutes: valid_break(defaults.break_minutes).unwrap_or(builtin.break_minutes),
            total_cycles: valid_cycles(defaults.total_cycles).unwrap_or(builtin.total_cycles),
        }
    }

    /// Parse raw front-end input. Anything unparseable or out of range falls
    /// back to the matching field of `defaults` rather than failing.
    pub fn parse(focus: &str, cycles: &str, brk: &str, defaults: &SessionDefaults) -> Self {
        let fallback = Self::from_defaults(defaults);

        let focus_minutes = focus
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(valid_focus)
            .unwrap_or_else(|| {
                tracing::warn!(input = focus, fallback = fallback.focus_minutes, "invalid focus length");
                fallback.focus_minutes
            });
        let total_cycles = cycles
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(valid_cycles)
            .unwrap_or_else(|| {
                tracing::warn!(input = cycles, fallback = fallback.total_cycles, "invalid cycle count");
                fallback.total_cycles
            });
        let break_minutes = brk
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(valid_break)
            .unwrap_or_else(|| {
                tracing::warn!(input = brk, fallback = fallback.break_minutes, "invalid break length");
                fallback.break_minutes
            });

        Self {
            focus_minutes,
            break_minutes,
            total_cycles,
        }
    }

    /// Replace invalid fields with values from `defaults`.
    pub fn sanitized(self, defaults: &SessionDefaults) -> Self {
        let fallback = Self::from_defaults(defaults);
        Self {
            focus_minutes: valid_focus(self.focus_minutes).unwrap_or(fallback.focus_minutes),
            break_minutes: valid_break(self.break_minutes).unwrap_or(fallback.break_minutes),
            total_cycles: valid_cycles(self.total_cycles).unwrap_or(fallback.total_cycles),
        }
    }

    /// Focus length; zero for an unsanitized out-of-range value.
    pub fn focus_duration(&self) -> Duration {
        duration_from_minutes(self.focus_minutes).unwrap_or_else(Duration::zero)
    }

    /// Break length; zero for an unsanitized out-of-range value.
    pub fn break_duration(&self) -> Duration {
        duration_from_minutes(self.break_minutes).unwrap_or_else(Duration::zero)
    }
}

/// `m` minutes rounded to the millisecond, or `None` when `m` is negative,
/// not finite, or too large for a [`Duration`].
pub(crate) fn duration_from_minutes(m: f64) -> Option<Duration> {
    if !m.is_finite() || m < 0.0 {
        return None;
    }
    let ms = (m * 60_000.0).round();
    if ms >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(ms as i64)
}

fn valid_focus(m: f64) -> Option<f64> {
    (m.is_finite() && m > 0.0 && m <= MAX_INTERVAL_MINUTES).then_some(m)
}

fn valid_break(m: f64) -> Option<f64> {
    (m.is_finite() && m >= 0.0 && m <= MAX_INTERVAL_MINUTES).then_some(m)
}

fn valid_cycles(n: u32) -> Option<u32> {
    (n >= 1).then_some(n)
}
