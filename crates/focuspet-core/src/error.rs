//! Core error types for focuspet-core.
//!
//! Only a few operations can fail outright: persisting the progress record and
//! reading/writing the TOML configuration. Corrupt progress never becomes an
//! error; the store substitutes defaults instead.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focuspet-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Progress storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Progress record storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Data directory could not be resolved or created
    #[error("Cannot prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the record failed
    #[error("Failed to write progress record to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the record failed
    #[error("Failed to encode progress record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not name a configuration value
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Value cannot be converted to the key's type
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_with_context() {
        let err: CoreError = ConfigError::UnknownKey("session.colour".into()).into();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown config key: session.colour"
        );
    }

    #[test]
    fn storage_error_converts() {
        fn save() -> Result<()> {
            Err(StorageError::WriteFailed {
                path: PathBuf::from("/nowhere/progress.json"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })?;
            Ok(())
        }
        let err = save().unwrap_err();
        assert!(matches!(err, CoreError::Storage(StorageError::WriteFailed { .. })));
        assert!(err.to_string().starts_with("Storage error: Failed to write progress record"));
    }
}
