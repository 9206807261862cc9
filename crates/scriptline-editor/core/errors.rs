//! Error types for the scriptline-editor crate
//!
//! `EditorError` wraps `CoreError` from scriptline-core and `StoreError` from
//! the backing store, and adds the validation failures of the annotator and
//! the session. Follows the same philosophy as core:
//! - Use thiserror for structured error handling (no anyhow)
//! - Surface store failures verbatim; nothing is retried

use scriptline_core::CoreError;
use thiserror::Error;

use crate::store::StoreError;

/// Main error type for scriptline-editor operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Errors from scriptline-core
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store call failed; no in-memory state was changed
    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),

    /// New tag range partially overlaps an existing one
    #[error(
        "Range [{start}, {end}) overlaps existing annotation [{existing_start}, {existing_end})"
    )]
    Conflict {
        start: usize,
        end: usize,
        existing_start: usize,
        existing_end: usize,
    },

    /// Selected text is empty after trimming
    #[error("Selection is empty")]
    EmptySelection,

    /// The same tag already covers this exact range
    #[error("Tag {tag_id} already covers [{start}, {end})")]
    DuplicateTag { tag_id: i64, start: usize, end: usize },

    /// Invalid character range
    #[error("Invalid range: start {start}, end {end} (body length: {length})")]
    InvalidRange {
        start: usize,
        end: usize,
        length: usize,
    },

    /// The operation needs an open thread or episode
    #[error("No thread or episode is open")]
    NoTarget,

    /// A parsed row index is out of range
    #[error("Parsed row not found: {index}")]
    RowNotFound { index: usize },

    /// Another mutation is in flight
    #[error("Session is busy with another operation")]
    Busy,
}

impl EditorError {
    /// Check if error is recoverable
    ///
    /// Everything except a broken store schema can be fixed by the user
    /// retrying or changing the input.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Core(core_err) => core_err.is_recoverable(),
            Self::Persistence(StoreError::MissingSchema { .. }) => false,
            Self::Persistence(_)
            | Self::Conflict { .. }
            | Self::EmptySelection
            | Self::DuplicateTag { .. }
            | Self::InvalidRange { .. }
            | Self::NoTarget
            | Self::RowNotFound { .. }
            | Self::Busy => true,
        }
    }

    /// Check if this error came from the backing store
    #[must_use]
    pub const fn is_persistence_error(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Check if this is an annotation validation error
    #[must_use]
    pub const fn is_annotation_error(&self) -> bool {
        matches!(
            self,
            Self::Conflict { .. }
                | Self::EmptySelection
                | Self::DuplicateTag { .. }
                | Self::InvalidRange { .. }
        )
    }

    /// Get the underlying core error if this wraps one
    #[must_use]
    pub const fn as_core_error(&self) -> Option<&CoreError> {
        match self {
            Self::Core(core_err) => Some(core_err),
            _ => None,
        }
    }
}

/// Result type alias for editor operations
pub type Result<T> = core::result::Result<T, EditorError>;
