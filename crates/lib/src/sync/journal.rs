//! Ordered log of applied events and their outcomes.

use super::op::ChangeOp;

/// The result of applying one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Position of the event in application order, starting at 1.
    pub seq: u64,
    pub op: ChangeOp,
    pub error: Option<crate::Error>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes in the order events were applied.
///
/// The journal only grows; callers clear it explicitly.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<Outcome>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, outcome: Outcome) {
        self.entries.push(outcome);
    }

    pub fn entries(&self) -> &[Outcome] {
        &self.entries
    }

    /// Outcomes that carry an error, in application order.
    pub fn errors(&self) -> impl Iterator<Item = &Outcome> {
        self.entries.iter().filter(|outcome| outcome.error.is_some())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn last(&self) -> Option<&Outcome> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
