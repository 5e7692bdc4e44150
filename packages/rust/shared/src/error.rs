//! Error types for docsearch.
//!
//! Library crates use [`DocSearchError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docsearch operations.
#[derive(Debug, thiserror::Error)]
pub enum DocSearchError {
    /// Configuration loading or validation error (including missing credentials).
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed input (content manifest, config, serialized index).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Content record failed boundary validation.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The remote service rejected the private key for this index.
    #[error("unauthorized for index {index_id}: {message}")]
    Unauthorized { index_id: String, message: String },

    /// Remote transport failure or a failed snapshot/deploy call.
    #[error("remote error: {message}")]
    Remote { message: String },

    /// Full-text engine failure while building, packing or querying an index.
    #[error("index error: {message}")]
    Index { message: String },

    /// Index serialization or compression error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocSearchError>;

impl DocSearchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a remote error from any displayable message.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote {
            message: msg.into(),
        }
    }

    /// Create an index engine error from any displayable message.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::Index {
            message: msg.into(),
        }
    }

    /// Create an authorization error for the given index.
    pub fn unauthorized(index_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Unauthorized {
            index_id: index_id.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocSearchError::config("ORAMA_CLOUD_PRIVATE_API_KEY env variable is required");
        assert_eq!(
            err.to_string(),
            "config error: ORAMA_CLOUD_PRIVATE_API_KEY env variable is required"
        );

        let err = DocSearchError::unauthorized("idx-1", "HTTP 401");
        assert_eq!(err.to_string(), "unauthorized for index idx-1: HTTP 401");

        let err = DocSearchError::index("failed to commit");
        assert_eq!(err.to_string(), "index error: failed to commit");
    }

    #[test]
    fn io_error_carries_path() {
        let err = DocSearchError::io(
            "/site/docs/missing.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.to_string().contains("missing.md"));
    }
}
