//! Core types and structures for the scriptline editor
//!
//! - `ScriptTarget`: which thread or episode body is open
//! - `BodyBuffer`: the body text and its clean/dirty state
//! - `OverrideCache`: process-local copy of the override tables
//! - History management for undo/redo
//! - Error types for editor operations

pub mod buffer;
pub mod errors;
pub mod history;
pub mod overrides;
pub mod sync;
pub mod target;

// Re-export commonly used types
pub use buffer::{BodyBuffer, BufferState};
pub use errors::{EditorError, Result};
pub use history::{HistoryEntry, HistoryStats, UndoStack, UndoStackConfig};
pub use overrides::OverrideCache;
pub use sync::SyncSession;
pub use target::{RowId, ScriptTarget};
