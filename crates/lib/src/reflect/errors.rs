//! Error types for value navigation and scalar coercion.

use thiserror::Error;

use crate::path::PathError;

/// Structured errors raised while reading or writing through a [`Reflect`](super::Reflect) handle.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReflectError {
    /// The struct has no field matching the key under the active lookup rules
    #[error("Field '{field}' not found in {type_name}")]
    FieldNotFound {
        field: String,
        type_name: &'static str,
    },

    /// No map entry or list element matched the key
    #[error("Entry not found: {key}")]
    EntryNotFound { key: String },

    /// A read walked into an unallocated optional slot
    #[error("Value of type {type_name} is not allocated")]
    NilPointer { type_name: &'static str },

    /// The field exists but is declared read-only
    #[error("Field '{field}' of {type_name} is not settable")]
    NotSettable {
        field: String,
        type_name: &'static str,
    },

    /// A value could not be converted to the destination type
    #[error("Cannot convert '{value}' to {target}: {reason}")]
    TypeNotConvertible {
        value: String,
        target: String,
        reason: String,
    },

    /// A numeric literal does not fit into the destination width
    #[error("Value '{value}' overflows {target}")]
    Overflow { value: String, target: String },

    /// A scalar was used where a container is required
    #[error("{type_name} is not a container")]
    NotAContainer { type_name: &'static str },

    /// The container kind is rejected outright (fixed-size arrays and similar)
    #[error("Unsupported container kind: {type_name}")]
    UnsupportedContainerKind { type_name: &'static str },

    /// The key is empty or malformed where a usable key is required
    #[error("Key '{key}' is not addressable: {reason}")]
    KeyNotAddressable { key: String, reason: String },

    /// A structured key failed to parse
    #[error("Invalid key: {0}")]
    InvalidKey(#[from] PathError),

    /// The same container was reached twice while resolving one event
    #[error("Structural cycle detected at {type_name}")]
    StructuralCycle { type_name: &'static str },
}

impl ReflectError {
    pub(crate) fn not_convertible(
        value: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ReflectError::TypeNotConvertible {
            value: value.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_addressable(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ReflectError::KeyNotAddressable {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error means the addressed value does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ReflectError::FieldNotFound { .. }
                | ReflectError::EntryNotFound { .. }
                | ReflectError::NilPointer { .. }
        )
    }

    /// Check if this error is a conversion failure
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ReflectError::TypeNotConvertible { .. }
                | ReflectError::Overflow { .. }
                | ReflectError::NotAContainer { .. }
        )
    }

    /// Check if retrying the same event can never succeed
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ReflectError::UnsupportedContainerKind { .. } | ReflectError::StructuralCycle { .. }
        )
    }

    /// Get the field name if this is a field-related error
    pub fn field(&self) -> Option<&str> {
        match self {
            ReflectError::FieldNotFound { field, .. } | ReflectError::NotSettable { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }

    /// Get the key if this is a key-related error
    pub fn key(&self) -> Option<&str> {
        match self {
            ReflectError::EntryNotFound { key } | ReflectError::KeyNotAddressable { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }

    /// Classifies this error for journal inspection.
    pub fn kind(&self) -> crate::ErrorKind {
        use crate::ErrorKind;
        match self {
            ReflectError::FieldNotFound { .. } => ErrorKind::FieldNotFound,
            ReflectError::EntryNotFound { .. } | ReflectError::NilPointer { .. } => {
                ErrorKind::PathNotFound
            }
            ReflectError::NotSettable { .. } => ErrorKind::NotSettable,
            ReflectError::TypeNotConvertible { .. }
            | ReflectError::Overflow { .. }
            | ReflectError::NotAContainer { .. } => ErrorKind::TypeNotConvertible,
            ReflectError::UnsupportedContainerKind { .. } => ErrorKind::UnsupportedContainerKind,
            ReflectError::KeyNotAddressable { .. } | ReflectError::InvalidKey(_) => {
                ErrorKind::KeyNotAddressable
            }
            ReflectError::StructuralCycle { .. } => ErrorKind::StructuralCycle,
        }
    }
}

impl From<ReflectError> for crate::Error {
    fn from(err: ReflectError) -> Self {
        crate::Error::Reflect(err)
    }
}
