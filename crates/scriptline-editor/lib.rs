//! Editing layer for narrative scripts
//!
//! `scriptline-editor` builds on `scriptline-core` to provide an editing
//! session over a thread or episode body: undoable classification
//! overrides, structural body edits and range tags, all persisted through
//! an async [`ScriptStore`].
//!
//! # Features
//!
//! - **Undo/redo**: linear history of reversible actions with depth limits
//! - **Fail-closed persistence**: a rejected store call changes nothing
//! - **Range tags**: character-offset annotations with conflict detection
//! - **Backends**: in-memory store, and SQLite behind the `sqlite` feature
//!
//! # Example
//!
//! ```
//! use futures::executor::block_on;
//! use scriptline_editor::{Classification, EditorSession, MemoryStore, ScriptTarget};
//!
//! let target = ScriptTarget::Thread(1);
//! let store = MemoryStore::new()
//!     .with_known_speakers(["アリス"])
//!     .with_body(target, "夜\nアリス\nこんにちは");
//!
//! let mut session = EditorSession::new(store);
//! block_on(session.load_overrides()).unwrap();
//! block_on(session.open(target)).unwrap();
//!
//! block_on(session.set_line_rule("夜", Some(Classification::Location))).unwrap();
//! assert_eq!(session.parsed_lines().len(), 2);
//!
//! block_on(session.undo()).unwrap();
//! assert_eq!(session.overrides().rule_for("夜"), None);
//! ```

#![deny(unsafe_code)]

pub mod annotations;
pub mod commands;
pub mod core;
pub mod sessions;
pub mod store;

// Re-export scriptline-core types as first-class citizens
pub use scriptline_core::{Classification, ClassifierConfig, LineKind, LineRule, ParsedLine};

// Public API exports
pub use annotations::{AnnotationChip, AnnotationId, NewAnnotation, Segment, TagAnnotation};
pub use commands::{ActionSide, HistoryAction};
pub use crate::core::{
    BufferState, EditorError, HistoryStats, Result, RowId, ScriptTarget, SyncSession,
    UndoStackConfig,
};
pub use sessions::{EditorSession, SessionConfig};
pub use store::{MemoryStore, ScriptStore, StoreError, StoreOp, StoreResult};

#[cfg(feature = "sqlite")]
pub use store::{SchemaCapabilities, SqliteStore};
