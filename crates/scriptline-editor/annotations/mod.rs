//! Tag annotations over character ranges of a body
//!
//! An annotation attaches a preset tag to `[start, end)` of the body that was
//! displayed when it was created. Within one scope, ranges either coincide
//! exactly (several tags on the same quote) or do not overlap at all, which
//! keeps rendering a flat sequence of non-overlapping segments.
//!
//! Bodies are not append-only, so stored offsets can drift out of bounds.
//! Such annotations stay in storage but are skipped by [`render`].

pub mod render;

pub use render::{render, AnnotationChip, Segment};

use core::fmt;

use log::debug;
use scriptline_core::utils::{char_len, char_slice};

use crate::core::errors::{EditorError, Result};
use crate::core::target::{RowId, ScriptTarget};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a persisted annotation
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(pub RowId);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted tag annotation
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAnnotation {
    /// Row id
    pub id: AnnotationId,
    /// Preset tag attached to the range
    pub tag_id: RowId,
    /// Owning thread or episode
    pub scope: ScriptTarget,
    /// Start character offset (inclusive)
    pub start_offset: usize,
    /// End character offset (exclusive)
    pub end_offset: usize,
    /// Body text of the range when the annotation was created
    pub selected_text: String,
}

impl TagAnnotation {
    /// Whether the range still fits a body of `body_len` characters
    #[must_use]
    pub const fn is_within(&self, body_len: usize) -> bool {
        self.start_offset < self.end_offset && self.end_offset <= body_len
    }

    /// Half-open overlap test
    #[must_use]
    pub const fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start_offset < end && start < self.end_offset
    }

    /// Same `(start, end)` pair
    #[must_use]
    pub const fn same_span(&self, start: usize, end: usize) -> bool {
        self.start_offset == start && self.end_offset == end
    }
}

/// An annotation that passed validation but has no id yet
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnotation {
    pub tag_id: RowId,
    pub scope: ScriptTarget,
    pub start_offset: usize,
    pub end_offset: usize,
    pub selected_text: String,
}

impl NewAnnotation {
    /// Attach the id assigned by the store
    #[must_use]
    pub fn with_id(self, id: AnnotationId) -> TagAnnotation {
        TagAnnotation {
            id,
            tag_id: self.tag_id,
            scope: self.scope,
            start_offset: self.start_offset,
            end_offset: self.end_offset,
            selected_text: self.selected_text,
        }
    }
}

/// In-memory annotations of one scope
///
/// A process-local cache of the store's rows; the session replaces it
/// wholesale after every insert or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSet {
    scope: ScriptTarget,
    items: Vec<TagAnnotation>,
}

impl AnnotationSet {
    /// Create an empty set for a scope
    #[must_use]
    pub const fn new(scope: ScriptTarget) -> Self {
        Self {
            scope,
            items: Vec::new(),
        }
    }

    /// Scope of this set
    #[must_use]
    pub const fn scope(&self) -> ScriptTarget {
        self.scope
    }

    /// Replace all annotations, ignoring rows from other scopes
    pub fn replace_all(&mut self, rows: Vec<TagAnnotation>) {
        let total = rows.len();
        self.items = rows.into_iter().filter(|a| a.scope == self.scope).collect();
        if self.items.len() != total {
            debug!(
                "dropped {} annotation rows outside scope {}",
                total - self.items.len(),
                self.scope
            );
        }
    }

    /// Validate a new annotation against `body` and the existing set
    ///
    /// # Errors
    ///
    /// - [`EditorError::InvalidRange`] unless `start < end <= body length`
    /// - [`EditorError::EmptySelection`] if the span is whitespace-only
    /// - [`EditorError::Conflict`] on a partial overlap with another range
    /// - [`EditorError::DuplicateTag`] if the same tag already covers the span
    pub fn prepare(
        &self,
        body: &str,
        start: usize,
        end: usize,
        tag_id: RowId,
    ) -> Result<NewAnnotation> {
        let length = char_len(body);
        if start >= end || end > length {
            return Err(EditorError::InvalidRange { start, end, length });
        }

        let selected = char_slice(body, start, end)
            .ok_or(EditorError::InvalidRange { start, end, length })?;
        if selected.trim().is_empty() {
            return Err(EditorError::EmptySelection);
        }

        for existing in &self.items {
            if existing.same_span(start, end) {
                if existing.tag_id == tag_id {
                    return Err(EditorError::DuplicateTag { tag_id, start, end });
                }
            } else if existing.overlaps(start, end) {
                return Err(EditorError::Conflict {
                    start,
                    end,
                    existing_start: existing.start_offset,
                    existing_end: existing.end_offset,
                });
            }
        }

        Ok(NewAnnotation {
            tag_id,
            scope: self.scope,
            start_offset: start,
            end_offset: end,
            selected_text: selected.to_string(),
        })
    }

    /// Add a persisted annotation
    pub fn insert(&mut self, annotation: TagAnnotation) {
        self.items.push(annotation);
        self.items.sort_by_key(|a| a.id);
    }

    /// Remove an annotation by id
    pub fn remove(&mut self, id: AnnotationId) -> Option<TagAnnotation> {
        let index = self.items.iter().position(|a| a.id == id)?;
        Some(self.items.remove(index))
    }

    /// Look up an annotation by id
    #[must_use]
    pub fn get(&self, id: AnnotationId) -> Option<&TagAnnotation> {
        self.items.iter().find(|a| a.id == id)
    }

    /// All annotations, stale ones included
    #[must_use]
    pub fn items(&self) -> &[TagAnnotation] {
        &self.items
    }

    /// Annotations whose range no longer fits `body`
    #[must_use]
    pub fn stale(&self, body: &str) -> Vec<&TagAnnotation> {
        let length = char_len(body);
        self.items.iter().filter(|a| !a.is_within(length)).collect()
    }

    /// Number of annotations
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
