pub mod config;
pub mod progress;
pub mod run;
pub mod status;

/// `MM:SS`, rounding to the nearest second and clamping at zero.
pub fn format_mmss(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
