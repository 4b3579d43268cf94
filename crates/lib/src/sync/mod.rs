//! Applying change events to a target value.
//!
//! A [`ChangeOp`] names an operation, the path of the parent node, the leaf
//! key, a type tag and a literal value. [`apply`] performs one event against
//! any [`Reflect`](crate::reflect::Reflect) value; a [`Replica`] owns a
//! target and applies a whole stream, recording each outcome in its
//! [`Journal`].
//!
//! Targets that want to handle their own updates expose one of the override
//! contracts ([`Updater`], [`DataUpdate`]) and may ask to be told about batch
//! boundaries ([`UpdateBounds`]).

mod apply;
mod contracts;
mod errors;
mod journal;
mod op;
mod replica;

pub use apply::apply;
pub use contracts::{DataUpdate, Override, UpdateBounds, Updater};
pub use errors::SyncError;
pub use journal::{Journal, Outcome};
pub use op::{ChangeOp, OpKind, ScalarTag, Tag};
pub use replica::Replica;
