//! The kill ring and the buffer operations built on it.
//!
//! One ring is shared by every buffer of a session. The caller owns it and
//! hands it to the kill/yank operations, so the buffer never reaches for
//! global state.

use std::collections::VecDeque;

use crate::buffer::{Buffer, LastCommand};
use crate::{BufferError, BufferResult};

/// Bounded rotating store of killed text, newest at the front.
#[derive(Debug, Clone)]
pub struct KillRing {
    entries: VecDeque<String>,
    max: usize,
    /// Index of the current entry; 0 is the newest
    index: usize,
}

impl KillRing {
    pub const DEFAULT_MAX: usize = 30;

    /// Creates a ring holding at most `max` entries.
    pub fn new(max: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max: max.max(1),
            index: 0,
        }
    }

    /// Pushes a new kill and makes it current, evicting the oldest on overflow.
    pub fn push(&mut self, text: impl Into<String>) {
        self.entries.push_front(text.into());
        self.entries.truncate(self.max);
        self.index = 0;
    }

    /// Appends `text` to the current entry, or pushes it if the ring is empty.
    pub fn append_to_current(&mut self, text: &str) {
        match self.entries.get_mut(self.index) {
            Some(entry) => entry.push_str(text),
            None => self.push(text),
        }
    }

    /// The entry a yank would insert.
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.index).map(String::as_str)
    }

    /// Moves the cursor to the next older entry, wrapping to the newest.
    pub fn rotate(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.entries.len();
        self.current()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX)
    }
}

impl Buffer {
    /// Copies `start..end` (in either order) onto the kill ring.
    ///
    /// With `append`, the text is added to the current entry instead.
    pub fn copy_region(
        &mut self,
        ring: &mut KillRing,
        start: usize,
        end: usize,
        append: bool,
    ) -> BufferResult<()> {
        self.begin_command();
        let text = self.substring(start, end)?;
        if append {
            ring.append_to_current(&text);
        } else {
            ring.push(text);
        }
        Ok(())
    }

    /// Moves `start..end` (in either order) to the kill ring.
    pub fn kill_region(
        &mut self,
        ring: &mut KillRing,
        start: usize,
        end: usize,
        append: bool,
    ) -> BufferResult<()> {
        self.copy_region(ring, start, end, append)?;
        self.delete_region(start, end)
    }

    /// Kills to the end of the line, or the line break itself at end of line.
    pub fn kill_line(&mut self, ring: &mut KillRing) -> BufferResult<()> {
        if self.point == self.point_max() {
            return Err(BufferError::EndOfBuffer);
        }
        let end = if self.is_eol() {
            self.storage.next_char_boundary(self.point)
        } else {
            self.end_of_line_position(self.point)
        };
        let start = self.point;
        self.kill_region(ring, start, end, false)
    }

    /// Kills forward to the end of the next word.
    pub fn kill_word(&mut self, ring: &mut KillRing) -> BufferResult<()> {
        let end = self.forward_word_position(self.point, 1);
        if end == self.point {
            return Err(BufferError::EndOfBuffer);
        }
        let start = self.point;
        self.kill_region(ring, start, end, false)
    }

    /// Kills backward to the start of the previous word.
    pub fn backward_kill_word(&mut self, ring: &mut KillRing) -> BufferResult<()> {
        let start = self.backward_word_position(self.point, 1);
        if start == self.point {
            return Err(BufferError::BeginningOfBuffer);
        }
        let end = self.point;
        self.kill_region(ring, start, end, false)
    }

    /// Inserts the current kill-ring entry at point.
    pub fn yank(&mut self, ring: &KillRing) -> BufferResult<()> {
        let text = ring.current().ok_or(BufferError::KillRingEmpty)?.to_string();
        self.begin_command();
        let start = self.point;
        self.insert(&text);
        self.last_command = LastCommand::Yank {
            start,
            end: self.point,
        };
        Ok(())
    }

    /// Replaces the text just yanked with the next older kill-ring entry.
    pub fn yank_pop(&mut self, ring: &mut KillRing) -> BufferResult<()> {
        let LastCommand::Yank { start, end } = self.last_command else {
            return Err(BufferError::NotYanked);
        };
        let text = ring.rotate().ok_or(BufferError::KillRingEmpty)?.to_string();
        self.begin_command();
        self.delete_range(start, end);
        self.insert_with(&text, start != end);
        self.last_command = LastCommand::Yank {
            start,
            end: self.point,
        };
        Ok(())
    }
}
