//! Error types for shape library operations.

use std::path::PathBuf;

use curvelib_codec::CodecError;
use thiserror::Error;

/// Errors that can occur while reading, writing or replaying shapes.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Shape name is empty, contains a path separator or carries the extension.
    #[error("Invalid shape name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// No file exists for the shape.
    #[error("File '{}' does not exist for shape '{name}'", path.display())]
    NotFound {
        /// Shape name.
        name: String,
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Filesystem read, write or delete failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// One command of a replay could not be turned into a curve.
    #[error("Could not create curve {index} from command '{command}': {reason}")]
    CurveConstruction {
        /// 1-based command index.
        index: usize,
        /// The offending command text.
        command: String,
        /// What went wrong.
        reason: String,
    },

    /// Encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The host refused an operation.
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

impl LibraryError {
    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason,
        }
    }
}

/// Failure reported by a host collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    /// Create a host error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
