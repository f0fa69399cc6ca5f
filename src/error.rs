//! Error types for image search and retrieval operations

use thiserror::Error;

/// Result type alias for image search operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Error types for the search-retrieve-filter-persist pipeline
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or decoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid configuration or parameters (fatal, never retried)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Search provider or transport errors (retryable up to the ceiling)
    #[error("Search error: {0}")]
    Search(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScoutError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new search/provider error
    pub fn search<S: Into<String>>(msg: S) -> Self {
        Self::Search(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a search error from a transport failure with context
    pub fn network_error<E: std::fmt::Display>(context: &str, error: E) -> Self {
        Self::Search(format!("{}: {}", context, error))
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Whether the error is retryable at the orchestrator level
    ///
    /// Only transport/provider failures qualify; configuration errors fail
    /// fast before any network activity.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Search(_))
    }
}
