// Error types for the task collection engine

use thiserror::Error;

/// Errors signaled by store and import operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    /// Task text empty after trimming, or longer than the limit
    #[error("Invalid task text: {0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    NotFound(String),

    /// Import payload is not an object with a `tasks` array
    #[error("Invalid import format: {0}")]
    Format(String),

    #[error("No valid tasks found in import")]
    EmptyImport,

    /// Underlying storage read or write failed
    #[error("Storage failure: {0}")]
    Persistence(String),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),
}

impl TodoError {
    pub(crate) fn persistence(err: eyre::Report) -> Self {
        TodoError::Persistence(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;
