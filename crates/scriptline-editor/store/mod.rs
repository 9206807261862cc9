//! Backing-store interface
//!
//! The editor never talks to a database directly. Everything it persists or
//! loads goes through [`ScriptStore`], whose methods are `async` so hosted
//! backends can await network calls. Two backends ship with the crate:
//!
//! - [`MemoryStore`]: process-local rows with failure injection
//! - `SqliteStore` (feature `sqlite`): rusqlite with schema capability detection

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::{SchemaCapabilities, SqliteStore};

use core::fmt;
use core::future::Future;

use scriptline_core::LineRule;
use thiserror::Error;

use crate::annotations::{AnnotationId, NewAnnotation, TagAnnotation};
use crate::core::target::ScriptTarget;

/// Errors reported by a backing store
///
/// Surfaced verbatim to the user; the editor never retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A table or column the call needs does not exist
    #[error("Missing schema object: {object}")]
    MissingSchema { object: String },

    /// Row-level access policy rejected the call
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// The addressed row does not exist
    #[error("Row not found: {0}")]
    NotFound(String),

    /// Any other backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a missing-schema error
    pub fn missing_schema<T: fmt::Display>(object: T) -> Self {
        Self::MissingSchema {
            object: object.to_string(),
        }
    }

    /// Create a backend error
    pub fn backend<T: fmt::Display>(message: T) -> Self {
        Self::Backend(message.to_string())
    }
}

/// Result type alias for store calls
pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// Store operations, for failure injection and call accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    LoadBlockedTerms,
    UpsertBlockedTerm,
    DeleteBlockedTerm,
    LoadLineRules,
    UpsertLineRule,
    DeleteLineRule,
    LoadKnownSpeakers,
    LoadAnnotations,
    InsertAnnotation,
    DeleteAnnotation,
    LoadBody,
    SaveBody,
}

/// Persistence collaborator of the editor
///
/// Loads return rows in display order. Upserts and deletes are idempotent
/// from the editor's point of view.
pub trait ScriptStore {
    /// Blocked terms in insertion order
    fn load_blocked_terms(&self) -> impl Future<Output = StoreResult<Vec<String>>> + Send;

    /// Add a blocked term (no-op if present)
    fn upsert_blocked_term(&self, term: &str) -> impl Future<Output = StoreResult<()>> + Send;

    /// Remove a blocked term (no-op if absent)
    fn delete_blocked_term(&self, term: &str) -> impl Future<Output = StoreResult<()>> + Send;

    /// All line rules
    fn load_line_rules(&self) -> impl Future<Output = StoreResult<Vec<LineRule>>> + Send;

    /// Insert or replace the rule for `rule.line_text`
    fn upsert_line_rule(&self, rule: &LineRule) -> impl Future<Output = StoreResult<()>> + Send;

    /// Remove the rule for a line (no-op if absent)
    fn delete_line_rule(&self, line_text: &str)
        -> impl Future<Output = StoreResult<()>> + Send;

    /// Names from the speaker directory
    fn load_known_speakers(&self) -> impl Future<Output = StoreResult<Vec<String>>> + Send;

    /// Annotations of one scope, ordered by id
    fn load_annotations(
        &self,
        scope: ScriptTarget,
    ) -> impl Future<Output = StoreResult<Vec<TagAnnotation>>> + Send;

    /// Persist a new annotation and return its id
    fn insert_annotation(
        &self,
        annotation: &NewAnnotation,
    ) -> impl Future<Output = StoreResult<AnnotationId>> + Send;

    /// Remove an annotation (no-op if absent)
    fn delete_annotation(&self, id: AnnotationId)
        -> impl Future<Output = StoreResult<()>> + Send;

    /// Body text of a thread or episode
    fn load_body(&self, target: ScriptTarget) -> impl Future<Output = StoreResult<String>> + Send;

    /// Overwrite the body text of a thread or episode
    fn save_body(
        &self,
        target: ScriptTarget,
        text: &str,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}
