//! Error types for event application.

use thiserror::Error;

use crate::ErrorKind;
use crate::path::PathError;
use crate::reflect::ReflectError;

/// Errors produced while applying a change event.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// A segment of the event path could not be resolved
    #[error("Path segment '{segment}' not resolved: {source}")]
    PathNotFound {
        segment: String,
        #[source]
        source: ReflectError,
    },

    /// Navigation or coercion failed at the leaf
    #[error(transparent)]
    Reflect(#[from] ReflectError),

    /// The event path text is malformed
    #[error(transparent)]
    Path(#[from] PathError),

    /// The operation is not one of create, replace or delete
    #[error("Unknown operation: {op}")]
    UnknownOperation { op: String },

    /// An override refused the event
    #[error("Update rejected: {reason}")]
    Rejected { reason: String },

    /// `begin_batch` was called while a batch was open
    #[error("A batch is already in progress")]
    BatchInProgress,

    /// `end_batch` was called without a matching `begin_batch`
    #[error("No batch in progress")]
    NoBatchInProgress,
}

impl SyncError {
    /// Convenience constructor for overrides refusing an event.
    pub fn rejected(reason: impl Into<String>) -> Self {
        SyncError::Rejected {
            reason: reason.into(),
        }
    }

    /// Check if this error means some part of the path does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            SyncError::PathNotFound { .. } => true,
            SyncError::Reflect(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a conversion failure
    pub fn is_type_error(&self) -> bool {
        match self {
            SyncError::Reflect(err) => err.is_type_error(),
            SyncError::PathNotFound { source, .. } => source.is_type_error(),
            _ => false,
        }
    }

    /// Check if retrying the same event can never succeed
    pub fn is_permanent(&self) -> bool {
        match self {
            SyncError::Reflect(err) | SyncError::PathNotFound { source: err, .. } => {
                err.is_permanent()
            }
            SyncError::Path(_) | SyncError::UnknownOperation { .. } => true,
            _ => false,
        }
    }

    /// Get the offending path segment if this is a path resolution error
    pub fn segment(&self) -> Option<&str> {
        match self {
            SyncError::PathNotFound { segment, .. } => Some(segment),
            _ => None,
        }
    }

    /// Classifies this error for journal inspection.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::PathNotFound { .. } => ErrorKind::PathNotFound,
            SyncError::Reflect(err) => err.kind(),
            SyncError::Path(_) => ErrorKind::InvalidPath,
            SyncError::UnknownOperation { .. } => ErrorKind::UnknownOperation,
            SyncError::Rejected { .. } => ErrorKind::Rejected,
            SyncError::BatchInProgress | SyncError::NoBatchInProgress => ErrorKind::Batch,
        }
    }
}

impl From<SyncError> for crate::Error {
    fn from(err: SyncError) -> Self {
        crate::Error::Sync(err)
    }
}
