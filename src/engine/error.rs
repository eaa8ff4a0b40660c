use crate::model::TimeWindow;

use super::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Candidate window with `open >= close`.
    InvalidWindow(TimeWindow),
    /// Candidate window intersects an existing window on the same day.
    Conflict { existing: TimeWindow },
    NotFound(&'static str),
    Validation(String),
    DuplicateName(String),
    LimitExceeded(&'static str),
    Store(String),
}

impl EngineError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidWindow(_) => "invalid_window",
            EngineError::Conflict { .. } => "conflict",
            EngineError::NotFound(_) => "not_found",
            EngineError::Validation(_) => "validation",
            EngineError::DuplicateName(_) => "duplicate_name",
            EngineError::LimitExceeded(_) => "limit_exceeded",
            EngineError::Store(_) => "store",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidWindow(w) => write!(
                f,
                "invalid window {w}: opening time must be before closing time"
            ),
            EngineError::Conflict { existing } => {
                write!(f, "window overlaps existing availability {existing}")
            }
            EngineError::NotFound(msg) => f.write_str(msg),
            EngineError::Validation(msg) => write!(f, "validation failed: {msg}"),
            EngineError::DuplicateName(name) => {
                write!(f, "a field named {name:?} already exists")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e.to_string())
    }
}
