//! # Gapmacs Buffer
//!
//! The text engine behind an Emacs-style editor: a gap buffer addressed by
//! character-aligned positions, with marks, undo/redo, a kill ring, regex
//! search and encoding-aware load/save.
//!
//! ## Address spaces
//!
//! Callers only ever see *user positions*: offsets into the logical text, which
//! is stored as UTF-8 and never contains the gap. Every position handed in or
//! out lies on a character boundary. *Storage offsets* include the gap and stay
//! private to [`gap`].
//!
//! ```text
//!  user:     0 1 2 3           4 5 6
//!            a b c |  (gap)  | d e f
//!  storage:  0 1 2 3 ... 3+g-1 3+g ...
//! ```
//!
//! ## Ownership
//! - `Buffer` owns its storage, undo history and mark table
//! - `Mark` is a plain handle; resolving it needs the owning `Buffer`
//! - `KillRing` is owned by the caller and passed into kill/yank operations

mod attributes;
mod buffer;
mod encoding;
mod gap;
mod history;
mod kill_ring;
mod mark;
mod search;

pub use attributes::AttributeValue;
pub use buffer::{Buffer, BufferConfig, BufferId};
pub use encoding::{FileFormat, default_encodings, encoding_for_label};
pub use history::{Edit, EditKind, History};
pub use kill_ring::KillRing;
pub use mark::Mark;
pub use search::MatchData;

/// Re-exported so callers can name encodings without depending on `encoding_rs`.
pub use encoding_rs::Encoding;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Beginning of buffer")]
    BeginningOfBuffer,

    #[error("End of buffer")]
    EndOfBuffer,

    #[error("Position {pos} is outside {min}..={max}")]
    OutOfRange { pos: usize, min: usize, max: usize },

    #[error("Position {0} is not on a character boundary")]
    NotCharBoundary(usize),

    #[error("Storage offset {0} is inside the gap")]
    InsideGap(usize),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("The mark is not set now")]
    MarkNotSet,

    #[error("Mark does not belong to a live buffer")]
    DetachedMark,

    #[error("Kill ring is empty")]
    KillRingEmpty,

    #[error("Previous command was not a yank")]
    NotYanked,

    #[error("Buffer has no file name")]
    NoFileName,

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Text cannot be encoded as {0}")]
    Unencodable(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BufferError {
    /// Returns true for errors caused by crossing the accessible region.
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            BufferError::BeginningOfBuffer
                | BufferError::EndOfBuffer
                | BufferError::OutOfRange { .. }
        )
    }
}
