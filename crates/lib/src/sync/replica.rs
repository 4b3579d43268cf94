//! A target value kept in sync by a stream of change events.

use tracing::{debug, trace, warn};

use super::apply::apply;
use super::contracts::DataUpdate;
use super::errors::SyncError;
use super::journal::{Journal, Outcome};
use super::op::{ChangeOp, OpKind, Tag};
use crate::Config;
use crate::reflect::Reflect;

/// Owns a target value together with the configuration used to update it and
/// the journal of every event applied so far.
///
/// A failing event never stops the stream: its error is recorded and later
/// events are applied as usual.
///
/// ```
/// use ysync::{ChangeOp, Replica, Tag, Value};
///
/// let mut replica = Replica::new(Value::Null);
/// replica.apply(ChangeOp::create(&[], "hostname", Tag::default(), "router1")).unwrap();
/// replica.apply(ChangeOp::create(&["interfaces"], "eth0", Tag::Map, "")).unwrap();
///
/// assert_eq!(
///     replica.target().to_string(),
///     r#"{"hostname":"router1","interfaces":{"eth0":{}}}"#
/// );
/// ```
#[derive(Debug)]
pub struct Replica<T> {
    target: T,
    config: Config,
    journal: Journal,
    batch: Option<Vec<ChangeOp>>,
    seq: u64,
}

impl<T: Reflect> Replica<T> {
    pub fn new(target: T) -> Self {
        Self::with_config(target, Config::default())
    }

    pub fn with_config(target: T, config: Config) -> Self {
        Self {
            target,
            config,
            journal: Journal::new(),
            batch: None,
            seq: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Applies one event and records its outcome.
    ///
    /// While a batch is open with `buffer_batches` set, the event is queued
    /// instead and applied by [`end_batch`](Self::end_batch).
    pub fn apply(&mut self, op: ChangeOp) -> crate::Result<()> {
        if self.config.buffer_batches
            && let Some(queue) = self.batch.as_mut()
        {
            trace!(op = %op, queued = queue.len() + 1, "buffering change");
            queue.push(op);
            return Ok(());
        }
        self.execute(op).map_err(Into::into)
    }

    /// Applies every event in order and returns how many failed.
    pub fn apply_all<I>(&mut self, ops: I) -> usize
    where
        I: IntoIterator<Item = ChangeOp>,
    {
        ops.into_iter()
            .map(|op| self.apply(op))
            .filter(Result::is_err)
            .count()
    }

    /// Opens a batch of related events.
    ///
    /// The target is notified through
    /// [`UpdateBounds`](super::UpdateBounds) when it exposes it. With
    /// `buffer_batches` the notification is deferred to the batch end so the
    /// target sees the queued events between start and end.
    pub fn begin_batch(&mut self) -> crate::Result<()> {
        if self.batch.is_some() {
            return Err(SyncError::BatchInProgress.into());
        }
        debug!(buffered = self.config.buffer_batches, "batch started");
        self.batch = Some(Vec::new());
        if !self.config.buffer_batches {
            self.notify_start();
        }
        Ok(())
    }

    /// Closes the open batch, applying queued events, and returns how many
    /// events of the batch failed when buffering (always 0 otherwise).
    pub fn end_batch(&mut self) -> crate::Result<usize> {
        let Some(queue) = self.batch.take() else {
            return Err(SyncError::NoBatchInProgress.into());
        };
        let failures = if self.config.buffer_batches {
            self.notify_start();
            queue
                .into_iter()
                .map(|op| self.execute(op))
                .filter(Result::is_err)
                .count()
        } else {
            0
        };
        if let Some(bounds) = self.target.update_bounds() {
            bounds.update_end();
        }
        debug!(failures, "batch ended");
        Ok(failures)
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_inner(self) -> T {
        self.target
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn journal_mut(&mut self) -> &mut Journal {
        &mut self.journal
    }

    /// Outcomes that carry an error, in application order.
    pub fn errors(&self) -> impl Iterator<Item = &Outcome> {
        self.journal.errors()
    }

    fn notify_start(&mut self) {
        if let Some(bounds) = self.target.update_bounds() {
            bounds.update_start();
        }
    }

    fn execute(&mut self, op: ChangeOp) -> Result<(), SyncError> {
        self.seq += 1;
        let result = apply(&mut self.target, &op, &self.config);
        if let Err(err) = &result {
            warn!(seq = self.seq, op = %op, error = %err, "change rejected");
        }
        self.journal.record(Outcome {
            seq: self.seq,
            op,
            error: result.as_ref().err().cloned().map(Into::into),
        });
        result
    }
}

impl<T: Reflect + Default> Default for Replica<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Reflect> DataUpdate for Replica<T> {
    fn update_create(&mut self, path: &str, value: &str) -> Result<(), SyncError> {
        let op = ChangeOp::from_path(OpKind::Create, path, Tag::default(), value)?;
        self.execute(op)
    }

    fn update_replace(&mut self, path: &str, value: &str) -> Result<(), SyncError> {
        let op = ChangeOp::from_path(OpKind::Replace, path, Tag::default(), value)?;
        self.execute(op)
    }

    fn update_delete(&mut self, path: &str) -> Result<(), SyncError> {
        let op = ChangeOp::from_path(OpKind::Delete, path, Tag::default(), "")?;
        self.execute(op)
    }
}
