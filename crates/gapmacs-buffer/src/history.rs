//! Undo/redo history.
//!
//! ## The Command Pattern
//!
//! Every primitive mutation is stored as an [`Edit`] that knows how to reverse
//! itself. The edits form one linear log with a cursor:
//!
//! ```text
//!  edits:  [e0] [e1] [e2] [e3]
//!                      ^cursor (e0, e1 applied; e2, e3 undone)
//! ```
//!
//! Undo walks the cursor back, redo walks it forward, and recording a new edit
//! while the cursor is not at the end throws the undone tail away. There is no
//! branching.
//!
//! An edit flagged `merge_with_previous` is undone and redone together with the
//! one before it, which is how a run of keystrokes becomes one undo step.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::buffer::Buffer;
use crate::{BufferError, BufferResult};

/// The type of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Text was inserted
    Insert,
    /// Text was deleted
    Delete,
}

/// A single recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// What kind of edit this is
    pub kind: EditKind,
    /// Position where the edit occurred
    pub position: usize,
    /// The text that was inserted or deleted
    pub content: String,
    /// Point before the edit was made
    pub point: usize,
    /// Undo/redo this edit together with the previous one
    pub merge_with_previous: bool,
}

impl Edit {
    /// Creates an insert edit.
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            position,
            content: content.into(),
            point: position,
            merge_with_previous: false,
        }
    }

    /// Creates a delete edit made with point at `point`.
    pub fn delete(position: usize, content: impl Into<String>, point: usize) -> Self {
        Self {
            kind: EditKind::Delete,
            position,
            content: content.into(),
            point,
            merge_with_previous: false,
        }
    }

    /// Flags this edit to merge with the previous one.
    pub fn merged(mut self, merge: bool) -> Self {
        self.merge_with_previous = merge;
        self
    }

    /// End of the affected range in the text that contains `content`.
    pub fn end(&self) -> usize {
        self.position + self.content.len()
    }
}

/// Linear undo log with a cursor and a "saved" marker.
#[derive(Debug, Clone)]
pub struct History {
    /// Recorded edits, oldest first
    edits: VecDeque<Edit>,
    /// Number of edits currently applied
    cursor: usize,
    /// Cursor value at the last save; `None` once that state is unreachable
    saved: Option<usize>,
    /// Maximum number of edits to keep
    limit: usize,
}

impl History {
    /// Creates a new history keeping at most `limit` edits.
    pub fn new(limit: usize) -> Self {
        Self {
            edits: VecDeque::new(),
            cursor: 0,
            saved: Some(0),
            limit,
        }
    }

    /// Records an edit, discarding any undone edits after the cursor.
    pub fn push(&mut self, edit: Edit) {
        if self.cursor < self.edits.len() {
            self.edits.truncate(self.cursor);
            if self.saved.is_some_and(|s| s > self.cursor) {
                self.saved = None;
            }
        }
        let first = self.cursor == 0;
        let merge = edit.merge_with_previous && !first;
        self.edits.push_back(edit.merged(merge));
        self.cursor += 1;
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        let mut dropped = 0;
        while self.edits.len() > self.limit {
            self.edits.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
            self.saved = match self.saved {
                Some(0) | None => None,
                Some(s) => Some(s - 1),
            };
            dropped += 1;
        }
        if dropped > 0 {
            if let Some(front) = self.edits.front_mut() {
                front.merge_with_previous = false;
            }
            tracing::debug!(dropped, limit = self.limit, "undo history trimmed");
        }
    }

    /// Collapses the `count` most recent applied edits into one undo step.
    pub fn merge_last(&mut self, count: usize) {
        let count = count.min(self.cursor);
        if count < 2 {
            return;
        }
        for i in self.cursor - count + 1..self.cursor {
            self.edits[i].merge_with_previous = true;
        }
    }

    /// Pops one undo step, newest edit first.
    pub fn undo(&mut self) -> Option<Vec<Edit>> {
        if self.cursor == 0 {
            return None;
        }
        let mut step = Vec::new();
        loop {
            self.cursor -= 1;
            let edit = self.edits[self.cursor].clone();
            let more = edit.merge_with_previous && self.cursor > 0;
            step.push(edit);
            if !more {
                break;
            }
        }
        Some(step)
    }

    /// Replays one redo step, oldest edit first.
    pub fn redo(&mut self) -> Option<Vec<Edit>> {
        if self.cursor == self.edits.len() {
            return None;
        }
        let mut step = Vec::new();
        loop {
            step.push(self.edits[self.cursor].clone());
            self.cursor += 1;
            let more = self
                .edits
                .get(self.cursor)
                .is_some_and(|e| e.merge_with_previous);
            if !more {
                break;
            }
        }
        Some(step)
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        self.cursor < self.edits.len()
    }

    /// Remembers the current cursor as the saved state.
    pub fn mark_saved(&mut self) {
        self.saved = Some(self.cursor);
    }

    /// Returns true if the cursor is at the saved state.
    pub fn is_at_saved(&self) -> bool {
        self.saved == Some(self.cursor)
    }

    /// Clears all history; the current state becomes the saved one.
    pub fn clear(&mut self) {
        self.edits.clear();
        self.cursor = 0;
        self.saved = Some(0);
    }

    /// Returns the number of edits that can be undone.
    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    /// Returns the number of edits that can be redone.
    pub fn redo_count(&self) -> usize {
        self.edits.len() - self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Buffer {
    /// Reverts the most recent undo step.
    pub fn undo(&mut self) -> BufferResult<()> {
        self.begin_command();
        let step = self.history.undo().ok_or(BufferError::NothingToUndo)?;
        self.widen_to_fit(&step);
        for edit in &step {
            match edit.kind {
                EditKind::Insert => {
                    self.raw_delete(edit.position, edit.end());
                }
                EditKind::Delete => {
                    self.move_point(edit.position);
                    self.raw_insert(&edit.content);
                }
            }
            self.move_point(edit.point);
        }
        tracing::trace!(edits = step.len(), "undo");
        Ok(())
    }

    /// Re-applies the most recently undone step.
    pub fn redo(&mut self) -> BufferResult<()> {
        self.begin_command();
        let step = self.history.redo().ok_or(BufferError::NothingToRedo)?;
        self.widen_to_fit(&step);
        for edit in &step {
            match edit.kind {
                EditKind::Insert => {
                    self.move_point(edit.position);
                    self.raw_insert(&edit.content);
                }
                EditKind::Delete => {
                    self.raw_delete(edit.position, edit.end());
                }
            }
        }
        tracing::trace!(edits = step.len(), "redo");
        Ok(())
    }

    /// Makes the last `count` edits undo as a single step.
    pub fn merge_undo(&mut self, count: usize) {
        self.history.merge_last(count);
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Replaying history may touch text outside a narrowed region.
    fn widen_to_fit(&mut self, step: &[Edit]) {
        let (min, max) = (self.point_min(), self.point_max());
        let outside = step.iter().any(|e| {
            let reach = match e.kind {
                EditKind::Insert => e.position,
                EditKind::Delete => e.end(),
            };
            e.position < min || reach > max || e.point < min || e.point > max
        });
        if outside {
            self.widen();
        }
    }
}
