//! Marks: positions that follow the text they point at.
//!
//! A [`Mark`] is a handle, not a reference. It names a slot in the owning
//! buffer's [`MarkTable`] together with that buffer's [`BufferId`] and the
//! slot's generation, so a mark never keeps a buffer alive and a stale or
//! foreign handle is detected instead of silently reading another mark.

use crate::buffer::{Buffer, BufferId};
use crate::{BufferError, BufferResult};

/// A handle to an auto-adjusting position inside one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mark {
    buffer: BufferId,
    slot: usize,
    generation: u64,
}

impl Mark {
    /// The buffer this mark belongs to.
    pub fn buffer_id(&self) -> BufferId {
        self.buffer
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    location: usize,
    generation: u64,
}

/// Live marks of one buffer.
#[derive(Debug, Default)]
pub(crate) struct MarkTable {
    slots: Vec<Option<Slot>>,
    next_generation: u64,
}

impl MarkTable {
    fn create(&mut self, owner: BufferId, location: usize) -> Mark {
        let generation = self.next_generation;
        self.next_generation += 1;
        let slot = Slot {
            location,
            generation,
        };
        let index = match self.slots.iter().position(Option::is_none) {
            Some(free) => {
                self.slots[free] = Some(slot);
                free
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        Mark {
            buffer: owner,
            slot: index,
            generation,
        }
    }

    fn slot(&self, mark: &Mark) -> Option<&Slot> {
        self.slots
            .get(mark.slot)?
            .as_ref()
            .filter(|s| s.generation == mark.generation)
    }

    fn slot_mut(&mut self, mark: &Mark) -> Option<&mut Slot> {
        self.slots
            .get_mut(mark.slot)?
            .as_mut()
            .filter(|s| s.generation == mark.generation)
    }

    fn remove(&mut self, mark: &Mark) -> bool {
        if self.slot(mark).is_none() {
            return false;
        }
        self.slots[mark.slot] = None;
        true
    }

    /// Number of live marks.
    pub(crate) fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Shifts marks for `len` bytes inserted at `pos`.
    ///
    /// A mark sitting exactly at `pos` stays before the new text.
    pub(crate) fn adjust_for_insert(&mut self, pos: usize, len: usize) {
        for slot in self.slots.iter_mut().flatten() {
            if slot.location > pos {
                slot.location += len;
            }
        }
    }

    /// Shifts marks for the deletion of `start..end`.
    pub(crate) fn adjust_for_delete(&mut self, start: usize, end: usize) {
        let removed = end - start;
        for slot in self.slots.iter_mut().flatten() {
            if slot.location >= end {
                slot.location -= removed;
            } else if slot.location > start {
                slot.location = start;
            }
        }
    }

    pub(crate) fn max_location(&self) -> Option<usize> {
        self.slots.iter().flatten().map(|s| s.location).max()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}

impl Buffer {
    /// Creates a mark at point.
    pub fn new_mark(&mut self) -> Mark {
        let id = self.id;
        let point = self.point;
        self.marks.create(id, point)
    }

    /// Creates a mark at `pos`.
    pub fn new_mark_at(&mut self, pos: usize) -> BufferResult<Mark> {
        self.check_position(pos)?;
        let id = self.id;
        Ok(self.marks.create(id, pos))
    }

    /// Returns the current location of `mark`.
    pub fn mark_location(&self, mark: Mark) -> BufferResult<usize> {
        if mark.buffer != self.id {
            return Err(BufferError::DetachedMark);
        }
        self.marks
            .slot(&mark)
            .map(|s| s.location)
            .ok_or(BufferError::DetachedMark)
    }

    /// Moves `mark` to `pos`.
    pub fn set_mark_location(&mut self, mark: Mark, pos: usize) -> BufferResult<()> {
        self.mark_location(mark)?;
        self.check_position(pos)?;
        if let Some(slot) = self.marks.slot_mut(&mark) {
            slot.location = pos;
        }
        Ok(())
    }

    /// Stops tracking `mark`. Returns false if it was already gone.
    pub fn delete_mark(&mut self, mark: Mark) -> bool {
        if mark.buffer != self.id {
            return false;
        }
        if self.the_mark == Some(mark) {
            self.the_mark = None;
        }
        self.marks.remove(&mark)
    }

    /// Number of marks this buffer is keeping up to date.
    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }

    /// Detaches every mark; used when the buffer is killed.
    pub fn detach_marks(&mut self) {
        tracing::debug!(buffer = %self.id, marks = self.marks.len(), "detaching marks");
        self.marks.clear();
        self.the_mark = None;
    }

    pub fn point_to_mark(&mut self, mark: Mark) -> BufferResult<()> {
        let location = self.mark_location(mark)?;
        self.goto_char(location)
    }

    pub fn mark_to_point(&mut self, mark: Mark) -> BufferResult<()> {
        let point = self.point;
        self.set_mark_location(mark, point)
    }

    pub fn swap_point_and_mark(&mut self, mark: Mark) -> BufferResult<()> {
        let location = self.mark_location(mark)?;
        let point = self.point;
        self.goto_char(location)?;
        self.set_mark_location(mark, point)
    }

    pub fn point_at_mark(&self, mark: Mark) -> BufferResult<bool> {
        Ok(self.point == self.mark_location(mark)?)
    }

    pub fn point_before_mark(&self, mark: Mark) -> BufferResult<bool> {
        Ok(self.point < self.mark_location(mark)?)
    }

    pub fn point_after_mark(&self, mark: Mark) -> BufferResult<bool> {
        Ok(self.point > self.mark_location(mark)?)
    }

    // ==================== The mark ====================

    /// Sets the buffer's distinguished mark at point.
    pub fn set_mark(&mut self) {
        let point = self.point;
        match self.the_mark {
            Some(mark) => {
                if let Some(slot) = self.marks.slot_mut(&mark) {
                    slot.location = point;
                }
            }
            None => self.the_mark = Some(self.new_mark()),
        }
    }

    /// Location of the distinguished mark, if set.
    pub fn mark(&self) -> Option<usize> {
        self.the_mark.and_then(|m| self.mark_location(m).ok())
    }

    /// The region between point and the mark, in ascending order.
    pub fn region(&self) -> BufferResult<(usize, usize)> {
        let mark = self.mark().ok_or(BufferError::MarkNotSet)?;
        Ok((self.point.min(mark), self.point.max(mark)))
    }
}
