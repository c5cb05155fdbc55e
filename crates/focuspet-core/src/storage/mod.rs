mod config;

pub use config::{CompanionConfig, Config, SessionDefaults};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/focuspet/`, creating it if needed.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("focuspet");

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
