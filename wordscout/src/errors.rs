//! Error types for wordscout.
//!
//! # Rust vs .NET Error Handling
//!
//! A .NET `Task` that throws stores the exception and rethrows it (wrapped in an
//! `AggregateException`) when someone calls `.Result` or `Task.WaitAll`:
//! ```csharp
//! try {
//!     Task.WaitAll(tasks);
//! } catch (AggregateException ex) {
//!     // Any of the tasks may have thrown
//! }
//! ```
//!
//! Here every task resolves to a `Result`, and the failure travels through the
//! task's handle as an ordinary value:
//! ```rust,ignore
//! match handle.wait() {
//!     Ok(result) => // Use result,
//!     Err(SearchError::MalformedInput { index, .. }) => // Only this block failed,
//!     Err(e) => // Task failure
//! }
//! ```
use thiserror::Error;

/// Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Malformed input in block {index}: {reason}")]
    MalformedInput { index: usize, reason: String },
    #[error("Task panicked: {0}")]
    TaskPanicked(String),
    #[error("Task was dropped before it reported a result")]
    TaskDropped,
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    pub fn malformed_input(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            index,
            reason: reason.into(),
        }
    }

    pub fn task_panicked(msg: impl Into<String>) -> Self {
        Self::TaskPanicked(msg.into())
    }

    pub fn thread_pool(msg: impl Into<String>) -> Self {
        Self::ThreadPool(msg.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<config::ConfigError> for SearchError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for SearchError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SearchError::malformed_input(3, "missing title delimiter");
        assert!(matches!(err, SearchError::MalformedInput { index: 3, .. }));

        let err = SearchError::task_panicked("boom");
        assert!(matches!(err, SearchError::TaskPanicked(_)));

        let err = SearchError::thread_pool("no threads");
        assert!(matches!(err, SearchError::ThreadPool(_)));

        let err = SearchError::invalid_pattern("(");
        assert!(matches!(err, SearchError::InvalidPattern(_)));

        let err = SearchError::config_error("bad value");
        assert!(matches!(err, SearchError::ConfigError(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = SearchError::malformed_input(0, "missing title delimiter ':'");
        assert_eq!(
            err.to_string(),
            "Malformed input in block 0: missing title delimiter ':'"
        );

        let err = SearchError::TaskDropped;
        assert_eq!(
            err.to_string(),
            "Task was dropped before it reported a result"
        );

        let err = SearchError::config_error("Missing required field".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required field"
        );
    }
}
