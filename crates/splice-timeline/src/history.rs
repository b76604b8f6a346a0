//! Snapshot-based undo/redo.
//!
//! Each entry is the timeline as it was before an edit. Undo swaps the
//! current state for the newest entry and keeps the current state for redo.

use std::collections::VecDeque;

use crate::timeline::TimelineSnapshot;

/// Bounded undo/redo history of timeline snapshots.
#[derive(Debug, Clone)]
pub struct History {
    /// States before each applied edit (most recent last).
    undo: VecDeque<TimelineSnapshot>,
    /// States undone, available for redo (most recent last).
    redo: Vec<TimelineSnapshot>,
    max_depth: usize,
}

impl History {
    /// Create a history keeping at most `max_depth` undo steps.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Record the state before an edit. Clears the redo stack.
    pub fn record(&mut self, before: TimelineSnapshot) {
        self.redo.clear();
        if self.max_depth == 0 {
            return;
        }
        self.undo.push_back(before);
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
    }

    /// Step back. `current` is the state being left; the returned snapshot is
    /// the one to restore.
    pub fn undo(&mut self, current: TimelineSnapshot) -> Option<TimelineSnapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: TimelineSnapshot) -> Option<TimelineSnapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        Some(next)
    }

    /// Put back a snapshot returned by `undo` whose restore failed.
    pub fn revert_undo(&mut self, snapshot: TimelineSnapshot) {
        self.redo.pop();
        self.undo.push_back(snapshot);
    }

    /// Put back a snapshot returned by `redo` whose restore failed.
    pub fn revert_redo(&mut self, snapshot: TimelineSnapshot) {
        self.undo.pop_back();
        self.redo.push(snapshot);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(200)
    }
}
