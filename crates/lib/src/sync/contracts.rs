//! Contracts a target implements to take over its own updates.
//!
//! A value that exposes one of these through
//! [`Reflect::overrides`](crate::reflect::Reflect::overrides) receives the
//! events addressed at or below it instead of having them applied
//! generically. When several nodes on an event's path expose an override,
//! the deepest one wins.

use super::SyncError;
use super::op::Tag;

/// Segment-based override.
///
/// `path` holds the event's path segments below the implementing node, `key`
/// is the leaf key. The node itself is responsible for everything beneath it.
pub trait Updater {
    fn create(&mut self, path: &[String], key: &str, tag: &Tag, value: &str)
    -> Result<(), SyncError>;

    fn replace(
        &mut self,
        path: &[String],
        key: &str,
        tag: &Tag,
        value: &str,
    ) -> Result<(), SyncError>;

    fn delete(&mut self, path: &[String], key: &str) -> Result<(), SyncError>;
}

/// Path-based override.
///
/// `path` is the slash-joined path from the implementing node to the leaf,
/// including the leaf key (`/interfaces/eth0/mtu`). For a member of a
/// `!!set` node ([`ChangeOp::is_set_member`](super::ChangeOp::is_set_member))
/// `path` stops at the set and the member key is passed as `value`.
pub trait DataUpdate {
    fn update_create(&mut self, path: &str, value: &str) -> Result<(), SyncError>;

    fn update_replace(&mut self, path: &str, value: &str) -> Result<(), SyncError>;

    fn update_delete(&mut self, path: &str) -> Result<(), SyncError>;
}

/// Notifications bracketing a batch of related events.
///
/// Only the top-level target is asked for this contract.
pub trait UpdateBounds {
    fn update_start(&mut self);

    fn update_end(&mut self);
}

/// The override a node exposes, if any.
pub enum Override<'a> {
    Segments(&'a mut dyn Updater),
    Paths(&'a mut dyn DataUpdate),
}

impl Override<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Override::Segments(_) => "segments",
            Override::Paths(_) => "paths",
        }
    }
}
