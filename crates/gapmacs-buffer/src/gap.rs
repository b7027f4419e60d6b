//! Gap storage: one contiguous byte array with a relocatable hole.
//!
//! The hole ("gap") sits wherever the next edit will happen. Inserting writes
//! into the front of the gap, deleting widens it, and moving it shifts only the
//! bytes between its old and new location. Bytes inside the gap are always
//! [`FILLER`].
//!
//! Two address spaces meet here. A user position `u` maps to storage offset
//! `u` when `u` is before the gap and to `u + gap_len` otherwise. The
//! [`StorageOffset`] newtype keeps the two from being mixed up.

use std::ops::Range;

use crate::{BufferError, BufferResult};

/// Slack added whenever the gap has to be reallocated.
pub(crate) const GAP_SIZE: usize = 256;

/// Value of every byte inside the gap.
pub(crate) const FILLER: u8 = 0;

/// An offset into the raw storage, gap included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct StorageOffset(pub(crate) usize);

#[derive(Debug)]
pub(crate) struct GapStorage {
    data: Vec<u8>,
    gap_start: usize,
    gap_end: usize,
}

impl GapStorage {
    pub(crate) fn new() -> Self {
        Self {
            data: vec![FILLER; GAP_SIZE],
            gap_start: 0,
            gap_end: GAP_SIZE,
        }
    }

    /// Builds storage holding `text` with the gap at position 0.
    pub(crate) fn from_text(text: &str) -> Self {
        let mut data = Vec::with_capacity(GAP_SIZE + text.len());
        data.resize(GAP_SIZE, FILLER);
        data.extend_from_slice(text.as_bytes());
        Self {
            data,
            gap_start: 0,
            gap_end: GAP_SIZE,
        }
    }

    /// Length of the logical text in bytes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len() - self.gap_len()
    }

    #[inline]
    pub(crate) fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// User position the gap currently sits at.
    #[inline]
    pub(crate) fn gap_position(&self) -> usize {
        self.gap_start
    }

    pub(crate) fn to_storage(&self, pos: usize) -> StorageOffset {
        if pos < self.gap_start {
            StorageOffset(pos)
        } else {
            StorageOffset(pos + self.gap_len())
        }
    }

    /// Converts a storage offset back to a user position.
    ///
    /// The first slot of the gap doubles as the boundary position itself;
    /// anything after it up to the gap end has no user position.
    pub(crate) fn to_user(&self, offset: StorageOffset) -> BufferResult<usize> {
        let StorageOffset(raw) = offset;
        if raw <= self.gap_start {
            Ok(raw)
        } else if raw < self.gap_end {
            Err(BufferError::InsideGap(raw))
        } else {
            Ok(raw - self.gap_len())
        }
    }

    pub(crate) fn byte_at(&self, pos: usize) -> Option<u8> {
        if pos >= self.len() {
            return None;
        }
        self.data.get(self.to_storage(pos).0).copied()
    }

    pub(crate) fn before_gap(&self) -> &[u8] {
        &self.data[..self.gap_start]
    }

    pub(crate) fn after_gap(&self) -> &[u8] {
        &self.data[self.gap_end..]
    }

    /// Copies the bytes of `range` out of storage, stitching across the gap.
    pub(crate) fn copy_range(&self, range: Range<usize>) -> Vec<u8> {
        let Range { start, end } = range;
        debug_assert!(start <= end && end <= self.len());
        let mut out = Vec::with_capacity(end - start);
        if end <= self.gap_start {
            out.extend_from_slice(&self.data[start..end]);
        } else if start >= self.gap_start {
            let offset = self.gap_len();
            out.extend_from_slice(&self.data[start + offset..end + offset]);
        } else {
            out.extend_from_slice(&self.data[start..self.gap_start]);
            let tail = end - self.gap_start;
            out.extend_from_slice(&self.data[self.gap_end..self.gap_end + tail]);
        }
        out
    }

    /// Returns `range` as one slice, moving the gap out of it first.
    pub(crate) fn contiguous(&mut self, range: Range<usize>) -> &[u8] {
        if self.gap_start > range.start && self.gap_start < range.end {
            self.move_gap(range.end);
        }
        let offset = self.to_storage(range.start);
        debug_assert_eq!(self.to_user(offset).ok(), Some(range.start));
        let StorageOffset(start) = offset;
        &self.data[start..start + range.len()]
    }

    /// Moves the gap to user position `pos`, shifting only the bytes between.
    pub(crate) fn move_gap(&mut self, pos: usize) {
        debug_assert!(pos <= self.len());
        if pos < self.gap_start {
            let count = self.gap_start - pos;
            let new_gap_end = self.gap_end - count;
            self.data.copy_within(pos..self.gap_start, new_gap_end);
            let vacated = pos..self.gap_start.min(new_gap_end);
            self.data[vacated].fill(FILLER);
            self.gap_start = pos;
            self.gap_end = new_gap_end;
        } else if pos > self.gap_start {
            let count = pos - self.gap_start;
            let new_gap_start = self.gap_start + count;
            let new_gap_end = self.gap_end + count;
            self.data
                .copy_within(self.gap_end..new_gap_end, self.gap_start);
            let vacated = self.gap_end.max(new_gap_start)..new_gap_end;
            self.data[vacated].fill(FILLER);
            self.gap_start = new_gap_start;
            self.gap_end = new_gap_end;
        }
        debug_assert!(self.gap_filled_with_filler());
    }

    /// Makes sure at least `needed` bytes fit into the gap.
    fn reserve(&mut self, needed: usize) {
        if self.gap_len() >= needed {
            return;
        }
        let slack = GAP_SIZE.max(self.len() / 16);
        let new_gap = needed + slack;
        let mut data = Vec::with_capacity(self.len() + new_gap);
        data.extend_from_slice(self.before_gap());
        data.resize(self.gap_start + new_gap, FILLER);
        data.extend_from_slice(self.after_gap());
        tracing::trace!(
            old_gap = self.gap_len(),
            new_gap,
            len = self.len(),
            "reallocating gap storage"
        );
        self.gap_end = self.gap_start + new_gap;
        self.data = data;
    }

    /// Writes `bytes` at the gap, leaving the gap right after them.
    pub(crate) fn insert(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        let end = self.gap_start + bytes.len();
        self.data[self.gap_start..end].copy_from_slice(bytes);
        self.gap_start = end;
    }

    /// Swallows `count` bytes after the gap into it.
    pub(crate) fn delete_forward(&mut self, count: usize) {
        debug_assert!(self.gap_end + count <= self.data.len());
        let end = self.gap_end + count;
        self.data[self.gap_end..end].fill(FILLER);
        self.gap_end = end;
    }

    /// Swallows `count` bytes before the gap into it.
    pub(crate) fn delete_backward(&mut self, count: usize) {
        debug_assert!(count <= self.gap_start);
        let start = self.gap_start - count;
        self.data[start..self.gap_start].fill(FILLER);
        self.gap_start = start;
    }

    pub(crate) fn gap_filled_with_filler(&self) -> bool {
        self.data[self.gap_start..self.gap_end]
            .iter()
            .all(|&b| b == FILLER)
    }

    // ==================== Character boundaries ====================

    pub(crate) fn is_char_boundary(&self, pos: usize) -> bool {
        if pos == 0 || pos == self.len() {
            return true;
        }
        match self.byte_at(pos) {
            Some(b) => !is_continuation(b),
            None => false,
        }
    }

    /// Position just past the character starting at `pos`.
    pub(crate) fn next_char_boundary(&self, pos: usize) -> usize {
        let width = self.byte_at(pos).map_or(1, utf8_width);
        (pos + width).min(self.len())
    }

    /// Start of the character ending at `pos`.
    pub(crate) fn prev_char_boundary(&self, pos: usize) -> usize {
        let mut start = pos.saturating_sub(1);
        while start > 0 && self.byte_at(start).is_some_and(is_continuation) {
            start -= 1;
        }
        start
    }

    pub(crate) fn char_at(&self, pos: usize) -> Option<char> {
        if pos >= self.len() {
            return None;
        }
        let end = self.next_char_boundary(pos);
        let bytes = self.copy_range(pos..end);
        std::str::from_utf8(&bytes).ok()?.chars().next()
    }
}

#[inline]
fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

#[inline]
fn utf8_width(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}
