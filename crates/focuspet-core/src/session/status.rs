use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Free-text status line for the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self::with(text, Severity::Info)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::with(text, Severity::Success)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::with(text, Severity::Warning)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::with(text, Severity::Error)
    }

    fn with(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}
