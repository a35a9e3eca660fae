//! Linear undo/redo stack of document snapshots.

use std::sync::Arc;

use crate::pipeline::extract::Palette;

/// Default number of snapshots kept on the stack.
pub const DEFAULT_LIMIT: usize = 50;

/// Serialized document plus the palette derived from it. Never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: String,
    pub palette: Palette,
}

impl Snapshot {
    pub fn new(document: String, palette: Palette) -> Self {
        Self { document, palette }
    }
}

/// Bounded snapshot stack with a cursor.
///
/// `cursor` always addresses a snapshot while the stack is non-empty. Pushing
/// while behind the head discards the redo branch. When the stack grows past
/// `limit` the oldest snapshot is dropped; the snapshot passed to the last
/// [`History::reset`] is kept aside so it can always be restored.
#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<Arc<Snapshot>>,
    cursor: usize,
    limit: usize,
    original: Option<Arc<Snapshot>>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl History {
    /// `limit` is clamped to at least 2 so one undo step always exists.
    pub fn new(limit: usize) -> Self {
        Self {
            stack: Vec::new(),
            cursor: 0,
            limit: limit.max(2),
            original: None,
        }
    }

    /// Replace the whole stack with a single snapshot.
    pub fn reset(&mut self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        self.original = Some(Arc::clone(&snapshot));
        self.stack = vec![snapshot];
        self.cursor = 0;
        tracing::debug!("history reset");
    }

    /// Restore the snapshot from the last reset as the only entry.
    /// Returns `false` when nothing was ever loaded.
    pub fn reset_to_original(&mut self) -> bool {
        let Some(original) = self.original.clone() else {
            return false;
        };
        self.stack = vec![original];
        self.cursor = 0;
        true
    }

    /// Append a snapshot after the cursor, dropping any redo branch.
    pub fn push_state(&mut self, snapshot: Snapshot) {
        if self.stack.is_empty() {
            self.reset(snapshot);
            return;
        }
        let discarded = self.stack.len() - 1 - self.cursor;
        self.stack.truncate(self.cursor + 1);
        self.stack.push(Arc::new(snapshot));
        if self.stack.len() > self.limit {
            self.stack.remove(0);
            tracing::debug!(limit = self.limit, "history full, evicted oldest snapshot");
        }
        self.cursor = self.stack.len() - 1;
        tracing::debug!(depth = self.stack.len(), discarded, "history push");
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.stack.len()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.stack.get(self.cursor).map(Arc::as_ref)
    }

    pub fn original(&self) -> Option<&Snapshot> {
        self.original.as_deref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Snapshots from oldest to newest.
    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.stack.iter().map(Arc::as_ref)
    }
}
