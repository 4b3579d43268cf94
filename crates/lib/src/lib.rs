//!
//! ysync: apply hierarchical change events onto typed Rust values.
//!
//! A synchronized document store announces every change as an event naming
//! a path of keys, a leaf key, a type tag and a literal value. This library
//! walks a caller-owned value along that path, allocating what is missing,
//! and creates, replaces or deletes the addressed child.
//!
//! ## Core Concepts
//!
//! * **Paths (`path`)**: slash-separated keys whose segments may carry
//!   bracketed qualifiers (`iface[name=eth0][unit=0]`).
//! * **Value handles (`reflect::Reflect`)**: a uniform, object-safe view over
//!   structs, maps, lists, optional slots, scalars and the dynamic
//!   `reflect::Value` document.
//! * **Navigation (`navigate`)**: single-step child lookup, creation and
//!   removal, including list addressing by index, position or content.
//! * **Synchronisation (`sync`)**: the per-event driver, the override
//!   contracts a target can implement to take over its own updates, and the
//!   `Replica` that owns a target together with its error journal.

pub mod config;
pub mod navigate;
pub mod path;
pub mod reflect;
pub mod sync;

pub use config::Config;
pub use reflect::{Reflect, Value};
pub use sync::{ChangeOp, Journal, OpKind, Outcome, Replica, Tag};

/// Result type used throughout the ysync library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the ysync library.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Structured path and key parsing errors from the path module
    #[error(transparent)]
    Path(path::PathError),

    /// Structured navigation and coercion errors from the reflect module
    #[error(transparent)]
    Reflect(reflect::ReflectError),

    /// Structured event application errors from the sync module
    #[error(transparent)]
    Sync(sync::SyncError),
}

/// Classification of every failure an event can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A path segment or list entry did not resolve.
    PathNotFound,
    /// A struct has no field matching the key.
    FieldNotFound,
    /// A field exists but cannot be written.
    NotSettable,
    /// A literal or value does not fit the destination type.
    TypeNotConvertible,
    /// The destination is a container kind events cannot address.
    UnsupportedContainerKind,
    /// A key is empty or malformed for its container.
    KeyNotAddressable,
    /// The event operation is not create, replace or delete.
    UnknownOperation,
    /// The walk revisited a container it already passed through.
    StructuralCycle,
    /// The path text is malformed.
    InvalidPath,
    /// An override refused the event.
    Rejected,
    /// Batch boundaries were misused.
    Batch,
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Path(_) => "path",
            Error::Reflect(_) => "reflect",
            Error::Sync(_) => "sync",
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Path(_) => ErrorKind::InvalidPath,
            Error::Reflect(reflect_err) => reflect_err.kind(),
            Error::Sync(sync_err) => sync_err.kind(),
        }
    }

    /// Check if this error indicates a path, entry or field was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Reflect(reflect_err) => reflect_err.is_not_found(),
            Error::Sync(sync_err) => sync_err.is_not_found(),
            Error::Path(_) => false,
        }
    }

    /// Check if this error is a value conversion failure.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Reflect(reflect_err) => reflect_err.is_type_error(),
            Error::Sync(sync_err) => sync_err.is_type_error(),
            Error::Path(_) => false,
        }
    }

    /// Check if replaying the same event can never succeed against the same
    /// target type.
    pub fn is_permanent(&self) -> bool {
        match self {
            Error::Path(_) => true,
            Error::Reflect(reflect_err) => reflect_err.is_permanent(),
            Error::Sync(sync_err) => sync_err.is_permanent(),
        }
    }
}
