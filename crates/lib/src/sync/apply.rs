//! Per-event application onto a value.

use std::any::{Any, TypeId};
use std::collections::HashSet;

use tracing::{debug, trace};

use super::contracts::Override;
use super::errors::SyncError;
use super::op::{ChangeOp, OpKind, Tag};
use crate::Config;
use crate::navigate::{self, SearchMode};
use crate::path::join_path;
use crate::reflect::coerce::scalar_set;
use crate::reflect::{Kind, Reflect, ReflectError, ReflectMut, debug_string, deref_mut, deref_ref};

/// Applies one event to `target`.
///
/// The event's path is walked from `target`, creating missing intermediate
/// nodes for create and replace, and the operation is performed on the leaf
/// key. When a node on the path exposes an [`Override`], the deepest such node
/// receives the event instead. Events addressing the root itself only change
/// a scalar root; anything else at the root is ignored.
pub fn apply(target: &mut dyn Reflect, op: &ChangeOp, config: &Config) -> Result<(), SyncError> {
    debug!(op = %op.kind, path = ?op.path, key = %op.key, tag = %op.tag, "applying change");

    if op.is_root() {
        return apply_root(target, op);
    }

    if let Some(depth) = probe_override(&mut *target, &op.path, config) {
        return delegate(target, op, depth, config);
    }

    let mut visited = Visited::default();
    let mut node = target;
    for segment in &op.path {
        visited.enter(&*node)?;
        let mode = SearchMode::for_list_key(segment, config);
        let next = match op.kind {
            OpKind::Delete => navigate::find(node, segment, mode, config),
            OpKind::Create | OpKind::Replace => {
                navigate::promote_to_map(&mut *node)?;
                navigate::find_or_init(node, segment, mode, config)
            }
        };
        node = next.map_err(|source| SyncError::PathNotFound {
            segment: segment.clone(),
            source,
        })?;
    }
    visited.enter(&*node)?;

    let mode = SearchMode::for_list_key(&op.key, config);
    match (op.kind, op.tag.shape()) {
        (OpKind::Delete, _) => navigate::child_unset(node, &op.key, mode, config)?,
        (_, Some(shape)) => {
            navigate::promote_to_map(&mut *node)?;
            navigate::child_materialize(node, &op.key, shape, mode, config)?
        }
        (_, None) => {
            navigate::promote_to_map(&mut *node)?;
            let dynamic = op.tag.to_value(&op.value);
            navigate::child_set_tagged(node, &op.key, &op.value, dynamic, mode, config)?
        }
    }
    trace!(parent = %debug_string(node), "change applied");
    Ok(())
}

fn apply_root(target: &mut dyn Reflect, op: &ChangeOp) -> Result<(), SyncError> {
    let Tag::Scalar(scalar) = &op.tag else {
        trace!(tag = %op.tag, "ignoring container event at the root");
        return Ok(());
    };
    if op.kind == OpKind::Delete {
        trace!("ignoring delete of the root");
        return Ok(());
    }
    let root = deref_mut(target, true)?;
    if let ReflectMut::Dynamic(value) = root.reflect_mut() {
        *value = scalar.to_value(&op.value);
        return Ok(());
    }
    if root.kind() == Kind::Scalar {
        scalar_set(root, &op.value)?;
    } else {
        trace!(root = root.type_name(), "ignoring scalar event at a container root");
    }
    Ok(())
}

/// Depth of the deepest node on `path` exposing an override, found without
/// allocating anything. Depth 0 is `target` itself.
fn probe_override(target: &mut dyn Reflect, path: &[String], config: &Config) -> Option<usize> {
    let mut deepest = has_override(&mut *target).then_some(0);
    let mut node = target;
    for (depth, segment) in path.iter().enumerate() {
        let mode = SearchMode::for_list_key(segment, config);
        match navigate::find(node, segment, mode, config) {
            Ok(child) => node = child,
            Err(_) => break,
        }
        if has_override(&mut *node) {
            deepest = Some(depth + 1);
        }
    }
    deepest
}

fn has_override(node: &mut dyn Reflect) -> bool {
    deref_mut(node, false).is_ok_and(|value| value.overrides().is_some())
}

fn delegate(
    target: &mut dyn Reflect,
    op: &ChangeOp,
    depth: usize,
    config: &Config,
) -> Result<(), SyncError> {
    let mut node = target;
    for segment in &op.path[..depth] {
        let mode = SearchMode::for_list_key(segment, config);
        node = navigate::find(node, segment, mode, config).map_err(|source| {
            SyncError::PathNotFound {
                segment: segment.clone(),
                source,
            }
        })?;
    }
    let node = deref_mut(node, false)?;
    let type_name = node.type_name();
    let remaining = &op.path[depth..];

    match node.overrides() {
        Some(Override::Segments(updater)) => {
            debug!(node = type_name, depth, remaining = ?remaining, "delegating to segment override");
            match op.kind {
                OpKind::Create => updater.create(remaining, &op.key, &op.tag, &op.value),
                OpKind::Replace => updater.replace(remaining, &op.key, &op.tag, &op.value),
                OpKind::Delete => updater.delete(remaining, &op.key),
            }
        }
        Some(Override::Paths(data)) => {
            let mut segments: Vec<&str> = remaining.iter().map(String::as_str).collect();
            // Set members are written as values of the set's own path
            let value = if op.is_set_member() {
                op.key.as_str()
            } else {
                if !op.key.is_empty() {
                    segments.push(&op.key);
                }
                op.value.as_str()
            };
            let path = join_path(&segments);
            debug!(node = type_name, depth, path = %path, "delegating to path override");
            match op.kind {
                OpKind::Create => data.update_create(&path, value),
                OpKind::Replace => data.update_replace(&path, value),
                OpKind::Delete => data.update_delete(&path),
            }
        }
        None => Err(SyncError::rejected(format!(
            "{type_name} stopped exposing an override"
        ))),
    }
}

/// Container identities already passed through by one walk.
#[derive(Default)]
struct Visited {
    seen: HashSet<(usize, TypeId)>,
}

impl Visited {
    fn enter(&mut self, node: &dyn Reflect) -> Result<(), ReflectError> {
        let Some(value) = deref_ref(node) else {
            return Ok(());
        };
        let address = value as *const dyn Reflect as *const () as usize;
        let identity = (address, Any::type_id(value.as_any()));
        if !self.seen.insert(identity) {
            return Err(ReflectError::StructuralCycle {
                type_name: value.type_name(),
            });
        }
        Ok(())
    }
}
