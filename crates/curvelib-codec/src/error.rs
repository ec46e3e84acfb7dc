//! Error types for curve command encoding and decoding.

use curvelib_nurbs::CurveDataError;
use thiserror::Error;

/// Errors that can occur while encoding or decoding curve commands.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// The object handed to the codec is not a NURBS curve.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: String,
        /// Actual type name.
        actual: String,
    },

    /// Lexer error: unexpected character or malformed token.
    #[error("Lexer error at line {line}, column {col}: {message}")]
    Lexer {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        col: usize,
        /// Error message.
        message: String,
    },

    /// Parser error: unexpected token or missing field.
    #[error("Parser error{}: {message}", field.as_ref().map(|f| format!(" in {f}")).unwrap_or_default())]
    Parser {
        /// Field being read when the error occurred, if known.
        field: Option<String>,
        /// Error message.
        message: String,
    },

    /// A declared count does not match the data.
    #[error("Count mismatch for {what}: expected {expected}, got {actual}")]
    CountMismatch {
        /// What was being counted.
        what: &'static str,
        /// Expected count.
        expected: usize,
        /// Actual count.
        actual: usize,
    },

    /// The curve itself is malformed (e.g. a control vertex cannot be read).
    #[error("Invalid curve: {0}")]
    InvalidCurve(String),
}

impl CodecError {
    /// Create a lexer error.
    pub fn lexer(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Lexer {
            line,
            col,
            message: message.into(),
        }
    }

    /// Create a parser error.
    pub fn parser(field: Option<&str>, message: impl Into<String>) -> Self {
        Self::Parser {
            field: field.map(str::to_string),
            message: message.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether this is a [`CodecError::TypeMismatch`].
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}

impl From<CurveDataError> for CodecError {
    fn from(err: CurveDataError) -> Self {
        match err {
            CurveDataError::ControlVertexCount { expected, actual } => Self::CountMismatch {
                what: "control vertices",
                expected,
                actual,
            },
            other => Self::InvalidCurve(other.to_string()),
        }
    }
}
