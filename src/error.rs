//! Error types for focusboard
//!
//! Three kinds of failure reach callers:
//! - not-found: an operation referenced an unknown task or column
//! - persistence: the task store rejected a create/update/delete
//! - decode: a board snapshot could not be parsed (only surfaced by `try_decode`,
//!   the public decoders fall back to an empty board)

use crate::domain::TaskStatus;
use thiserror::Error;

/// Main error type for board operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Column not found: {0:?}")]
    ColumnNotFound(TaskStatus),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Snapshot could not be decoded: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by an unknown task or column id
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TaskNotFound(_) | Error::ColumnNotFound(_))
    }

    /// Short message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Error::TaskNotFound(_) => "That task no longer exists.".to_string(),
            Error::ColumnNotFound(status) => format!("No column for {}.", status.title()),
            Error::Persistence(msg) => format!("Could not save changes: {}", msg),
            Error::Decode(_) => "The saved board could not be read.".to_string(),
            Error::Io(e) => format!("File error: {}", e),
            Error::Json(e) => format!("Data error: {}", e),
        }
    }
}

/// Result type alias for board operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::TaskNotFound("x".into()).is_not_found());
        assert!(Error::ColumnNotFound(TaskStatus::Done).is_not_found());
        assert!(!Error::Persistence("disk full".into()).is_not_found());
    }

    #[test]
    fn test_user_message_includes_store_reason() {
        let err = Error::Persistence("disk full".into());
        assert!(err.user_message().contains("disk full"));
    }
}
