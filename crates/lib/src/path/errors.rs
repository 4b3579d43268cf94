//! Error types for path and structured-key parsing.

use thiserror::Error;

/// Errors produced while splitting a path or decomposing a structured key.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A bracket or quote was opened and never closed, or closed without being opened.
    #[error("Unbalanced delimiter in '{input}' at offset {offset}")]
    Unbalanced { input: String, offset: usize },

    /// A bracketed qualifier did not contain a `field=value` pair.
    #[error("Qualifier '[{qualifier}]' in '{input}' is missing '='")]
    MissingEquals { input: String, qualifier: String },
}

impl PathError {
    /// Check if this error is caused by unbalanced delimiters
    pub fn is_unbalanced(&self) -> bool {
        matches!(self, PathError::Unbalanced { .. })
    }

    /// The text that failed to parse.
    pub fn input(&self) -> &str {
        match self {
            PathError::Unbalanced { input, .. } | PathError::MissingEquals { input, .. } => input,
        }
    }

    /// Byte offset of the offending delimiter, if known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            PathError::Unbalanced { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}
