//! Error types shared by the mining workspace.
//!
//! Every variant here is raised during the **preparation phase** (loading the
//! graph, validating parameters, building the worker pool). The search itself
//! has no error path: an empty embedding set or an exhausted domain is an
//! ordinary negative answer, not a failure.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a mining run before it starts.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed graph description.
    #[error("Format error on line {line}: {reason}")]
    Format {
        /// 1-based line number, 0 when the problem is not tied to a line.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The graph file could not be read.
    #[error("Failed to read graph file {path:?}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Engine parameters rejected by validation.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// A pattern built from user-supplied parts breaks a structural invariant.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl Error {
    /// Create a format error tied to a 1-based line number.
    pub fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            reason: reason.into(),
        }
    }

    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parameter validation error.
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Create a pattern validation error.
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }

    /// Create a worker pool error.
    pub fn thread_pool(msg: impl Into<String>) -> Self {
        Self::ThreadPool(msg.into())
    }

    /// True for errors caused by malformed graph input.
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}
