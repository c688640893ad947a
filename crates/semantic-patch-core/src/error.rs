//! Error types for the semantic patcher.
//!
//! Errors never cross rule boundaries: the executor folds them into an
//! [`Outcome`](crate::Outcome) and the coordinator only tallies them.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for semantic patching.
#[derive(Debug, Error)]
pub enum PatchError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    // Rule errors
    #[error("Invalid detection pattern for {rule}: {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type alias for semantic patch operations.
pub type Result<T> = std::result::Result<T, PatchError>;

impl PatchError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        PatchError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PatchError::NotADirectory(PathBuf::from("/tmp/v8"));
        assert_eq!(err.to_string(), "Path is not a directory: /tmp/v8");
    }

    #[test]
    fn test_io_with_path_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PatchError::io_with_path(io, "/tmp/v8/src/objects/string.cc");
        match err {
            PatchError::Io { path, source, .. } => {
                assert_eq!(path, Some(PathBuf::from("/tmp/v8/src/objects/string.cc")));
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
