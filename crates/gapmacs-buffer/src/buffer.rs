//! Core buffer implementation on top of the gap storage.
//!
//! ## Point and the gap
//!
//! Between calls the gap always sits at point. Motions move the gap with
//! point, so an edit at point never has to shift text first, and everything
//! after point is one contiguous slice.
//!
//! ## Positions
//!
//! Positions are offsets into the UTF-8 text. They must lie on character
//! boundaries; motions step whole characters. Every mutation goes through
//! [`Buffer::raw_insert`] / [`Buffer::raw_delete`], which keep the marks and
//! the narrowing bounds in step, and the public wrappers record the edit in
//! the undo history.

use encoding_rs::{Encoding, UTF_8};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use unicode_width::UnicodeWidthChar;
use uuid::Uuid;

use crate::attributes::AttributeValue;
use crate::encoding::{self, FileFormat};
use crate::gap::GapStorage;
use crate::history::{Edit, History};
use crate::mark::{Mark, MarkTable};
use crate::search::MatchData;
use crate::{BufferError, BufferResult};

const DEFAULT_TAB_WIDTH: usize = 8;

/// Unique identity of a buffer, carried by its marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(Uuid);

impl BufferId {
    /// Creates a new unique buffer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BufferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for buffer behavior
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Maximum number of undo entries to keep
    pub undo_limit: usize,

    /// Encodings tried, in order, when loading a file
    pub auto_detect_encodings: Vec<&'static Encoding>,

    /// Line-ending convention for text that has no line break yet
    pub default_file_format: FileFormat,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            undo_limit: 1000,
            auto_detect_encodings: encoding::default_encodings(),
            default_file_format: FileFormat::Unix,
        }
    }
}

/// What the previous command left behind for the next one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum LastCommand {
    #[default]
    Other,
    /// A vertical motion; consecutive ones keep aiming for `goal`
    Vertical { goal: usize },
    /// Text just inserted by a yank
    Yank { start: usize, end: usize },
}

/// A text buffer backed by gap storage.
#[derive(Debug)]
pub struct Buffer {
    pub(crate) id: BufferId,
    name: Option<String>,
    pub(crate) storage: GapStorage,
    pub(crate) point: usize,
    /// Accessible region when narrowed
    narrowing: Option<(usize, usize)>,
    pub(crate) marks: MarkTable,
    pub(crate) the_mark: Option<Mark>,
    pub(crate) history: History,
    pub(crate) last_command: LastCommand,
    pub(crate) match_data: Option<MatchData>,
    attributes: HashMap<String, AttributeValue>,
    file_path: Option<PathBuf>,
    file_encoding: &'static Encoding,
    file_format: FileFormat,
    file_mtime: Option<SystemTime>,
    new_file: bool,
    config: BufferConfig,
}

impl Buffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use gapmacs_buffer::Buffer;
    ///
    /// let buffer = Buffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    /// Creates an empty buffer with custom configuration.
    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            id: BufferId::new(),
            name: None,
            storage: GapStorage::new(),
            point: 0,
            narrowing: None,
            marks: MarkTable::default(),
            the_mark: None,
            history: History::new(config.undo_limit),
            last_command: LastCommand::Other,
            match_data: None,
            attributes: HashMap::new(),
            file_path: None,
            file_encoding: UTF_8,
            file_format: config.default_file_format,
            file_mtime: None,
            new_file: false,
            config,
        }
    }

    /// Creates a buffer holding `text`, normalizing its line endings.
    pub fn from_text(text: &str, config: BufferConfig) -> Self {
        let mut buffer = Self::with_config(config);
        buffer.load_text(text);
        buffer
    }

    fn load_text(&mut self, text: &str) {
        let format = if text.contains(['\r', '\n']) {
            FileFormat::detect(text)
        } else {
            self.config.default_file_format
        };
        self.storage = GapStorage::from_text(&format.normalize(text));
        self.file_format = format;
        self.point = 0;
    }

    // ==================== Identity ====================

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the buffer renamed to `name`.
    ///
    /// Registered buffers are renamed through the registry, which keeps names unique.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the associated file path, if any.
    pub fn file_name(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_name(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    // ==================== Measurements ====================

    /// Length of the whole text in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.len() == 0
    }

    #[inline]
    pub fn point(&self) -> usize {
        self.point
    }

    #[inline]
    pub fn point_min(&self) -> usize {
        self.narrowing.map_or(0, |(min, _)| min)
    }

    #[inline]
    pub fn point_max(&self) -> usize {
        self.narrowing.map_or(self.len(), |(_, max)| max)
    }

    pub fn is_bob(&self) -> bool {
        self.point == self.point_min()
    }

    pub fn is_eob(&self) -> bool {
        self.point == self.point_max()
    }

    pub fn is_bol(&self) -> bool {
        self.point == self.point_min() || self.storage.byte_at(self.point - 1) == Some(b'\n')
    }

    pub fn is_eol(&self) -> bool {
        self.point == self.point_max() || self.storage.byte_at(self.point) == Some(b'\n')
    }

    /// True when every byte inside the gap is filler.
    pub fn gap_filled_with_filler(&self) -> bool {
        self.storage.gap_filled_with_filler()
    }

    // ==================== Text Access ====================

    /// Returns the text between two positions, in either order.
    pub fn substring(&self, start: usize, end: usize) -> BufferResult<String> {
        let (start, end) = (start.min(end), start.max(end));
        self.check_position(start)?;
        self.check_position(end)?;
        Ok(self.text_between(start, end))
    }

    pub(crate) fn text_between(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.storage.copy_range(start..end)).into_owned()
    }

    /// The character after point.
    pub fn char_after(&self) -> Option<char> {
        self.char_at(self.point)
    }

    /// The character before point.
    pub fn char_before(&self) -> Option<char> {
        if self.point == self.point_min() {
            return None;
        }
        self.char_at(self.storage.prev_char_boundary(self.point))
    }

    /// The character starting at `pos` within the accessible region.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        if pos < self.point_min() || pos >= self.point_max() {
            return None;
        }
        self.storage.char_at(pos)
    }

    // ==================== Position checks ====================

    pub(crate) fn check_position(&self, pos: usize) -> BufferResult<()> {
        self.check_within(pos, self.point_min(), self.point_max())
    }

    fn check_within(&self, pos: usize, min: usize, max: usize) -> BufferResult<()> {
        if pos < min || pos > max {
            return Err(BufferError::OutOfRange { pos, min, max });
        }
        if !self.storage.is_char_boundary(pos) {
            return Err(BufferError::NotCharBoundary(pos));
        }
        Ok(())
    }

    /// Moves point and the gap together. `pos` must already be valid.
    pub(crate) fn move_point(&mut self, pos: usize) {
        debug_assert!(pos <= self.len());
        self.storage.move_gap(pos);
        self.point = pos;
    }

    /// Forgets the previous command, returning what it left behind.
    pub(crate) fn begin_command(&mut self) -> LastCommand {
        std::mem::take(&mut self.last_command)
    }

    fn offset_forward(&self, from: usize, chars: usize) -> Option<usize> {
        let max = self.point_max();
        let mut pos = from;
        for _ in 0..chars {
            if pos >= max {
                return None;
            }
            pos = self.storage.next_char_boundary(pos);
        }
        Some(pos)
    }

    fn offset_backward(&self, from: usize, chars: usize) -> Option<usize> {
        let min = self.point_min();
        let mut pos = from;
        for _ in 0..chars {
            if pos <= min {
                return None;
            }
            pos = self.storage.prev_char_boundary(pos);
        }
        Some(pos)
    }

    // ==================== Motion ====================

    /// Moves point to `pos`.
    pub fn goto_char(&mut self, pos: usize) -> BufferResult<()> {
        self.check_position(pos)?;
        self.begin_command();
        self.move_point(pos);
        Ok(())
    }

    /// Moves point forward by `n` characters.
    pub fn forward_char(&mut self, n: usize) -> BufferResult<()> {
        let target = self
            .offset_forward(self.point, n)
            .ok_or(BufferError::EndOfBuffer)?;
        self.begin_command();
        self.move_point(target);
        Ok(())
    }

    /// Moves point backward by `n` characters.
    pub fn backward_char(&mut self, n: usize) -> BufferResult<()> {
        let target = self
            .offset_backward(self.point, n)
            .ok_or(BufferError::BeginningOfBuffer)?;
        self.begin_command();
        self.move_point(target);
        Ok(())
    }

    pub fn beginning_of_buffer(&mut self) {
        self.begin_command();
        self.move_point(self.point_min());
    }

    pub fn end_of_buffer(&mut self) {
        self.begin_command();
        self.move_point(self.point_max());
    }

    pub(crate) fn beginning_of_line_position(&self, pos: usize) -> usize {
        let min = self.point_min();
        let mut p = pos;
        while p > min && self.storage.byte_at(p - 1) != Some(b'\n') {
            p -= 1;
        }
        p
    }

    pub(crate) fn end_of_line_position(&self, pos: usize) -> usize {
        let max = self.point_max();
        let mut p = pos;
        while p < max && self.storage.byte_at(p) != Some(b'\n') {
            p += 1;
        }
        p
    }

    pub fn beginning_of_line(&mut self) {
        self.begin_command();
        self.move_point(self.beginning_of_line_position(self.point));
    }

    pub fn end_of_line(&mut self) {
        self.begin_command();
        self.move_point(self.end_of_line_position(self.point));
    }

    /// Moves down `n` lines, keeping the goal column; clamps at the last line.
    pub fn next_line(&mut self, n: usize) {
        let goal = self.goal_column();
        let mut clamped = false;
        for _ in 0..n {
            let eol = self.end_of_line_position(self.point);
            if eol >= self.point_max() {
                clamped = true;
                break;
            }
            self.move_point(eol + 1);
        }
        if clamped {
            self.move_point(self.point_max());
        } else {
            self.move_to_column(goal);
        }
        self.last_command = LastCommand::Vertical { goal };
    }

    /// Moves up `n` lines, keeping the goal column; clamps at the first line.
    pub fn previous_line(&mut self, n: usize) {
        let goal = self.goal_column();
        let mut clamped = false;
        for _ in 0..n {
            let bol = self.beginning_of_line_position(self.point);
            if bol <= self.point_min() {
                clamped = true;
                break;
            }
            self.move_point(bol - 1);
        }
        if clamped {
            self.move_point(self.point_min());
        } else {
            self.move_to_column(goal);
        }
        self.last_command = LastCommand::Vertical { goal };
    }

    fn goal_column(&mut self) -> usize {
        match self.begin_command() {
            LastCommand::Vertical { goal } => goal,
            _ => self.current_column(),
        }
    }

    /// Moves to the first position on the current line whose column reaches `goal`.
    fn move_to_column(&mut self, goal: usize) {
        let bol = self.beginning_of_line_position(self.point);
        let eol = self.end_of_line_position(bol);
        let tab_width = self.tab_width();
        let mut pos = bol;
        let mut column = 0;
        while column < goal && pos < eol {
            if let Some(c) = self.storage.char_at(pos) {
                column = advance_column(column, c, tab_width);
            }
            pos = self.storage.next_char_boundary(pos);
        }
        self.move_point(pos);
    }

    /// Moves to the beginning of the `n`th following line, or the end of the buffer.
    pub fn forward_line(&mut self, n: usize) {
        self.begin_command();
        for _ in 0..n {
            let eol = self.end_of_line_position(self.point);
            if eol >= self.point_max() {
                self.move_point(self.point_max());
                return;
            }
            self.move_point(eol + 1);
        }
        self.move_point(self.beginning_of_line_position(self.point));
    }

    /// Moves to the beginning of 1-based `line`.
    pub fn goto_line(&mut self, line: usize) {
        self.beginning_of_buffer();
        self.forward_line(line.saturating_sub(1));
    }

    /// 1-based line number of point.
    pub fn current_line(&self) -> usize {
        debug_assert_eq!(self.storage.gap_position(), self.point);
        self.storage
            .before_gap()
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1
    }

    /// Display column of point, honoring wide characters and tab stops.
    pub fn current_column(&self) -> usize {
        let bol = self.beginning_of_line_position(self.point);
        let tab_width = self.tab_width();
        self.text_between(bol, self.point)
            .chars()
            .fold(0, |column, c| advance_column(column, c, tab_width))
    }

    fn tab_width(&self) -> usize {
        self.attribute("tab_width")
            .and_then(AttributeValue::as_int)
            .and_then(|w| usize::try_from(w).ok())
            .filter(|&w| w > 0)
            .unwrap_or(DEFAULT_TAB_WIDTH)
    }

    fn is_word_char(&self, pos: usize) -> bool {
        self.storage.char_at(pos).is_some_and(char::is_alphanumeric)
    }

    pub(crate) fn forward_word_position(&self, from: usize, n: usize) -> usize {
        let max = self.point_max();
        let mut pos = from;
        for _ in 0..n {
            while pos < max && !self.is_word_char(pos) {
                pos = self.storage.next_char_boundary(pos);
            }
            while pos < max && self.is_word_char(pos) {
                pos = self.storage.next_char_boundary(pos);
            }
        }
        pos
    }

    pub(crate) fn backward_word_position(&self, from: usize, n: usize) -> usize {
        let min = self.point_min();
        let mut pos = from;
        for _ in 0..n {
            while pos > min && !self.is_word_char(self.storage.prev_char_boundary(pos)) {
                pos = self.storage.prev_char_boundary(pos);
            }
            while pos > min && self.is_word_char(self.storage.prev_char_boundary(pos)) {
                pos = self.storage.prev_char_boundary(pos);
            }
        }
        pos
    }

    /// Moves past the end of the `n`th next word.
    pub fn forward_word(&mut self, n: usize) -> BufferResult<()> {
        if n > 0 && self.point == self.point_max() {
            return Err(BufferError::EndOfBuffer);
        }
        self.begin_command();
        let target = self.forward_word_position(self.point, n);
        self.move_point(target);
        Ok(())
    }

    /// Moves to the start of the `n`th previous word.
    pub fn backward_word(&mut self, n: usize) -> BufferResult<()> {
        if n > 0 && self.point == self.point_min() {
            return Err(BufferError::BeginningOfBuffer);
        }
        self.begin_command();
        let target = self.backward_word_position(self.point, n);
        self.move_point(target);
        Ok(())
    }

    // ==================== Primitive mutations ====================

    /// Inserts at point without recording history.
    pub(crate) fn raw_insert(&mut self, text: &str) {
        let pos = self.point;
        let len = text.len();
        debug_assert_eq!(self.storage.gap_position(), pos);
        self.storage.insert(text.as_bytes());
        self.marks.adjust_for_insert(pos, len);
        if let Some((min, max)) = &mut self.narrowing {
            if *min > pos {
                *min += len;
            }
            if *max >= pos {
                *max += len;
            }
        }
        self.point = pos + len;
    }

    /// Deletes `start..end` without recording history; point ends at `start`.
    pub(crate) fn raw_delete(&mut self, start: usize, end: usize) -> String {
        let text = self.text_between(start, end);
        let count = end - start;
        if self.storage.gap_position() == end {
            self.storage.delete_backward(count);
        } else {
            self.storage.move_gap(start);
            self.storage.delete_forward(count);
        }
        self.point = start;
        self.marks.adjust_for_delete(start, end);
        if let Some((min, max)) = &mut self.narrowing {
            *min = shift_for_delete(*min, start, end);
            *max = shift_for_delete(*max, start, end);
        }
        debug_assert!(self.marks.max_location().map_or(true, |m| m <= self.len()));
        text
    }

    /// Deletes `start..end`, adjusting point like a mark, and records it.
    pub(crate) fn delete_range(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        let before = self.point;
        let text = self.raw_delete(start, end);
        self.move_point(shift_for_delete(before, start, end));
        self.history.push(Edit::delete(start, text, before));
    }

    pub(crate) fn insert_with(&mut self, text: &str, merge: bool) {
        if text.is_empty() {
            return;
        }
        let pos = self.point;
        self.raw_insert(text);
        self.history.push(Edit::insert(pos, text).merged(merge));
    }

    // ==================== Mutations ====================

    /// Inserts `text` at point and moves point past it.
    pub fn insert(&mut self, text: &str) {
        self.begin_command();
        self.insert_with(text, false);
    }

    /// Inserts `text`, undoing together with the previous edit.
    pub fn insert_merging(&mut self, text: &str) {
        self.begin_command();
        self.insert_with(text, true);
    }

    /// Breaks the line, carrying the current indentation to the new line.
    ///
    /// Trailing blanks before point are removed first.
    pub fn newline(&mut self) {
        self.begin_command();
        let bol = self.beginning_of_line_position(self.point);
        let head = self.text_between(bol, self.point);
        let indent_len = head.len() - head.trim_start_matches([' ', '\t']).len();
        let indent = head[..indent_len].to_string();
        let blank_start = bol + head.trim_end_matches([' ', '\t']).len();
        let trimmed = blank_start < self.point;
        if trimmed {
            let point = self.point;
            self.delete_range(blank_start, point);
        }
        self.insert_with(&format!("\n{indent}"), trimmed);
    }

    /// Deletes `n` characters forward (`n > 0`) or backward (`n < 0`).
    pub fn delete_char(&mut self, n: isize) -> BufferResult<()> {
        let count = n.unsigned_abs();
        let (start, end) = if n >= 0 {
            let end = self
                .offset_forward(self.point, count)
                .ok_or(BufferError::EndOfBuffer)?;
            (self.point, end)
        } else {
            let start = self
                .offset_backward(self.point, count)
                .ok_or(BufferError::BeginningOfBuffer)?;
            (start, self.point)
        };
        self.begin_command();
        self.delete_range(start, end);
        Ok(())
    }

    /// Deletes `n` characters before point.
    pub fn backward_delete_char(&mut self, n: usize) -> BufferResult<()> {
        let start = self
            .offset_backward(self.point, n)
            .ok_or(BufferError::BeginningOfBuffer)?;
        self.begin_command();
        let end = self.point;
        self.delete_range(start, end);
        Ok(())
    }

    /// Deletes the text between two positions, in either order.
    pub fn delete_region(&mut self, start: usize, end: usize) -> BufferResult<()> {
        let (start, end) = (start.min(end), start.max(end));
        self.check_position(start)?;
        self.check_position(end)?;
        self.begin_command();
        self.delete_range(start, end);
        Ok(())
    }

    /// Swaps the characters around point; at end of line, the two before it.
    pub fn transpose_chars(&mut self) -> BufferResult<()> {
        let mut pos = self.point;
        if self.is_eol() && pos > self.point_min() {
            pos = self.storage.prev_char_boundary(pos);
        }
        if pos == self.point_min() {
            return Err(BufferError::BeginningOfBuffer);
        }
        let before = self.storage.prev_char_boundary(pos);
        let after = self
            .offset_forward(pos, 1)
            .ok_or(BufferError::EndOfBuffer)?;
        self.begin_command();
        let swapped = format!(
            "{}{}",
            self.text_between(pos, after),
            self.text_between(before, pos)
        );
        self.move_point(pos);
        self.delete_range(before, after);
        self.insert_with(&swapped, true);
        Ok(())
    }

    /// Runs `f`, then puts point back where it was, adjusted for edits `f` made.
    pub fn save_excursion<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mark = self.new_mark();
        let result = f(self);
        if let Ok(location) = self.mark_location(mark) {
            if self.check_position(location).is_ok() {
                self.move_point(location);
            }
        }
        self.delete_mark(mark);
        result
    }

    // ==================== Narrowing ====================

    /// Restricts the accessible region to `start..end` (in either order).
    pub fn narrow_to_region(&mut self, start: usize, end: usize) -> BufferResult<()> {
        let (start, end) = (start.min(end), start.max(end));
        let len = self.len();
        self.check_within(start, 0, len)?;
        self.check_within(end, 0, len)?;
        self.begin_command();
        self.narrowing = Some((start, end));
        let clamped = self.point.clamp(start, end);
        self.move_point(clamped);
        Ok(())
    }

    /// Makes the whole buffer accessible again.
    pub fn widen(&mut self) {
        self.narrowing = None;
    }

    // ==================== Attributes ====================

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Stores a buffer-local attribute, returning the previous value.
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.attributes.insert(key.into(), value.into())
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<AttributeValue> {
        self.attributes.remove(key)
    }

    pub fn attributes(&self) -> &HashMap<String, AttributeValue> {
        &self.attributes
    }

    // ==================== File Operations ====================

    /// Loads a buffer from a file, detecting encoding and line endings.
    ///
    /// A missing file yields an empty buffer flagged as new.
    pub fn open(path: impl AsRef<Path>, config: &BufferConfig) -> BufferResult<Self> {
        let path = path.as_ref();
        let mut buffer = Self::with_config(config.clone());
        buffer.file_path = Some(path.to_path_buf());
        match std::fs::read(path) {
            Ok(bytes) => {
                let (file_encoding, text) =
                    encoding::decode(&bytes, &buffer.config.auto_detect_encodings);
                buffer.load_text(&text);
                buffer.file_encoding = file_encoding;
                buffer.file_mtime = modified_time(path);
                tracing::info!(
                    path = %path.display(),
                    encoding = file_encoding.name(),
                    format = %buffer.file_format,
                    "loaded file"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                buffer.new_file = true;
                tracing::debug!(path = %path.display(), "new file");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(buffer)
    }

    /// Saves the buffer to its associated file.
    pub fn save(&mut self) -> BufferResult<()> {
        let path = self.file_path.clone().ok_or(BufferError::NoFileName)?;
        self.save_as(path)
    }

    /// Saves the buffer to `path` and associates it with the buffer.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> BufferResult<()> {
        let path = path.as_ref();
        let text = self.to_string();
        let bytes = encoding::encode(&self.file_format.denormalize(&text), self.file_encoding)?;
        write_atomically(path, &bytes)?;

        self.file_path = Some(path.to_path_buf());
        self.file_mtime = modified_time(path);
        self.new_file = false;
        self.history.mark_saved();
        tracing::info!(
            path = %path.display(),
            bytes = bytes.len(),
            encoding = self.file_encoding.name(),
            format = %self.file_format,
            "saved file"
        );
        Ok(())
    }

    pub fn file_encoding(&self) -> &'static Encoding {
        self.file_encoding
    }

    pub fn set_file_encoding(&mut self, encoding: &'static Encoding) {
        self.file_encoding = encoding;
    }

    /// Sets the save encoding from a label such as `"euc-jp"`.
    pub fn set_file_encoding_label(&mut self, label: &str) -> BufferResult<()> {
        self.file_encoding = encoding::encoding_for_label(label)?;
        Ok(())
    }

    pub fn file_format(&self) -> FileFormat {
        self.file_format
    }

    pub fn set_file_format(&mut self, format: FileFormat) {
        self.file_format = format;
    }

    /// True if the file did not exist when the buffer was opened and has not been saved.
    pub fn is_new_file(&self) -> bool {
        self.new_file
    }

    /// Returns true if the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        !self.history.is_at_saved()
    }

    /// True if the backing file changed on disk since it was loaded or saved.
    pub fn file_modified_on_disk(&self) -> bool {
        match &self.file_path {
            Some(path) => modified_time(path) != self.file_mtime,
            None => false,
        }
    }
}

fn advance_column(column: usize, c: char, tab_width: usize) -> usize {
    if c == '\t' {
        column + tab_width - column % tab_width
    } else {
        column + c.width().unwrap_or(0)
    }
}

/// Where a position ends up after `start..end` is deleted.
fn shift_for_delete(pos: usize, start: usize, end: usize) -> usize {
    if pos >= end {
        pos - (end - start)
    } else if pos > start {
        start
    } else {
        pos
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Writes to a sibling temporary file and renames it over `path`.
///
/// Symlinks are followed to the real file, whose permissions carry over.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let target = match std::fs::canonicalize(path) {
        Ok(real) => real,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
        Err(e) => return Err(e),
    };
    let permissions = std::fs::metadata(&target).ok().map(|m| m.permissions());
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = target.with_file_name(format!(".{file_name}.gapmacs-save"));
    let result = std::fs::write(&temp_path, bytes)
        .and_then(|()| match permissions {
            Some(permissions) => std::fs::set_permissions(&temp_path, permissions),
            None => Ok(()),
        })
        .and_then(|()| std::fs::rename(&temp_path, &target));
    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.storage.before_gap()))?;
        f.write_str(&String::from_utf8_lossy(self.storage.after_gap()))
    }
}

impl From<&str> for Buffer {
    fn from(s: &str) -> Self {
        Self::from_text(s, BufferConfig::default())
    }
}

impl From<String> for Buffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
