//! # Gapmacs Core
//!
//! Session-wide state shared by every buffer.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                    Editor                     │
//! │  ┌──────────┐ ┌───────────┐ ┌──────────────┐  │
//! │  │  Config  │ │ Kill Ring │ │  Mode Table  │  │
//! │  └──────────┘ └───────────┘ └──────────────┘  │
//! │  ┌─────────────────────────────────────────┐  │
//! │  │             Buffer Registry             │  │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐    │  │
//! │  │  │ Buffer  │ │ Buffer  │ │ Buffer  │    │  │
//! │  │  └─────────┘ └─────────┘ └─────────┘    │  │
//! │  └─────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! One `Editor` exists per process and a single interactive actor drives
//! it, so nothing here is synchronized.

pub mod config;
pub mod editor;
pub mod mode;
pub mod registry;

pub use config::{Config, ConfigError};
pub use editor::Editor;
pub use mode::{Mode, ModeTable, FUNDAMENTAL_MODE};
pub use registry::BufferRegistry;

use gapmacs_buffer::BufferId;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Buffer not found: {0}")]
    BufferNotFound(BufferId),

    #[error("No current buffer")]
    NoCurrentBuffer,

    #[error("Buffer error: {0}")]
    Buffer(#[from] gapmacs_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid mode pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
