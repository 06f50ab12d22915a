//! Error types for TrendLens.
//!
//! Library crates use [`TrendLensError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Provider failures (network, bad status, malformed payloads) are recovered
//! inside the adapters and never surface here; the variants below cover the
//! structural failures that abort a stage.

use std::path::PathBuf;

/// Top-level error type for all TrendLens operations.
#[derive(Debug, thiserror::Error)]
pub enum TrendLensError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error that a caller chose to treat as fatal.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Snapshot file is missing required structure or cannot be decoded.
    #[error("snapshot error: {message}")]
    Snapshot { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TrendLensError>;

impl TrendLensError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a snapshot error from any displayable message.
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot {
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
        let err = TrendLensError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = TrendLensError::snapshot("expected a JSON array");
        assert!(err.to_string().contains("expected a JSON array"));
    }
}
