//! Editing session for one thread or episode body
//!
//! An [`EditorSession`] owns the store handle, the override cache, the body
//! buffer of the open target, its parsed lines and annotations, and the
//! undo/redo history. Mutators take `&mut self`, so at most one edit is in
//! flight per session; wrap it in [`crate::SyncSession`] to share it.
//!
//! Every store call is awaited before memory changes. A failed call returns
//! [`EditorError::Persistence`] and leaves the session as it was.

use log::{debug, warn};
use scriptline_core::{transform, Classification, ClassifierConfig, LineClassifier, ParsedLine};

use crate::annotations::{render, AnnotationId, AnnotationSet, Segment, TagAnnotation};
use crate::commands::{ActionContext, ActionSide, HistoryAction};
use crate::core::buffer::{BodyBuffer, BufferState};
use crate::core::errors::{EditorError, Result};
use crate::core::history::{HistoryEntry, HistoryStats, UndoStack, UndoStackConfig};
use crate::core::overrides::OverrideCache;
use crate::core::target::{RowId, ScriptTarget};
use crate::store::ScriptStore;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for an editing session
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Classifier behavior
    pub classifier: ClassifierConfig,

    /// History limits
    pub history: UndoStackConfig,
}

/// Single-user editing session over a [`ScriptStore`]
#[derive(Debug)]
pub struct EditorSession<S> {
    store: S,
    classifier: LineClassifier,
    overrides: OverrideCache,
    history: UndoStack,
    target: Option<ScriptTarget>,
    buffer: BodyBuffer,
    parsed: Vec<ParsedLine>,
    annotations: Option<AnnotationSet>,
}

impl<S: ScriptStore> EditorSession<S> {
    /// Create a session with the default configuration
    ///
    /// Nothing is loaded; call [`Self::load_overrides`] and [`Self::open`].
    pub fn new(store: S) -> Self {
        Self::from_parts(store, LineClassifier::new(), UndoStack::new())
    }

    /// Create a session with a custom configuration
    pub fn with_config(store: S, config: SessionConfig) -> Result<Self> {
        let classifier = LineClassifier::with_config(config.classifier)?;
        Ok(Self::from_parts(
            store,
            classifier,
            UndoStack::with_config(config.history),
        ))
    }

    fn from_parts(store: S, classifier: LineClassifier, history: UndoStack) -> Self {
        Self {
            store,
            classifier,
            overrides: OverrideCache::new(),
            history,
            target: None,
            buffer: BodyBuffer::default(),
            parsed: Vec::new(),
            annotations: None,
        }
    }

    /// Reload blocked terms, line rules and the speaker directory
    pub async fn load_overrides(&mut self) -> Result<()> {
        self.overrides.reload(&self.store).await?;
        self.reparse();
        Ok(())
    }

    /// Reload only the speaker directory (after the host edited it)
    pub async fn reload_known_speakers(&mut self) -> Result<()> {
        self.overrides.reload_known_speakers(&self.store).await?;
        self.reparse();
        Ok(())
    }

    /// Open the body of a thread or episode
    ///
    /// Loads the body and its annotations, then clears the history: actions
    /// recorded against another body cannot be undone here. If either load
    /// fails, the previously open target stays open.
    pub async fn open(&mut self, target: ScriptTarget) -> Result<()> {
        let (body, rows) = futures::try_join!(
            self.store.load_body(target),
            self.store.load_annotations(target),
        )?;

        let mut annotations = AnnotationSet::new(target);
        annotations.replace_all(rows);

        if let Some(current) = self.target {
            if self.buffer.is_dirty() {
                warn!("opening {target} discards unsaved edits to {current}");
            }
            if current != target {
                debug!("switching from {current} to {target}, clearing history");
            }
        }
        self.history.clear();
        self.target = Some(target);
        self.buffer = BodyBuffer::loaded(body);
        self.annotations = Some(annotations);
        self.reparse();

        debug!(
            "opened {target}: {} parsed lines, {} annotations",
            self.parsed.len(),
            self.annotations().len()
        );
        Ok(())
    }

    /// Close the open target, discarding unsaved edits and history
    pub fn close(&mut self) {
        if let Some(target) = self.target.take() {
            if self.buffer.is_dirty() {
                warn!("closing {target} with unsaved edits");
            }
        }
        self.history.clear();
        self.buffer = BodyBuffer::default();
        self.annotations = None;
        self.parsed.clear();
    }

    #[must_use]
    pub const fn target(&self) -> Option<ScriptTarget> {
        self.target
    }

    /// Current body text
    #[must_use]
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// Whether the body has unsaved changes
    #[must_use]
    pub fn state(&self) -> BufferState {
        self.buffer.state()
    }

    /// Lines of the last classification
    #[must_use]
    pub fn parsed_lines(&self) -> &[ParsedLine] {
        &self.parsed
    }

    #[must_use]
    pub const fn overrides(&self) -> &OverrideCache {
        &self.overrides
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Annotations of the open target, stale ones included
    #[must_use]
    pub fn annotations(&self) -> &[TagAnnotation] {
        self.annotations
            .as_ref()
            .map(AnnotationSet::items)
            .unwrap_or_default()
    }

    /// Classify the current body, reporting an empty result as an error
    pub fn parse_current(&self) -> Result<Vec<ParsedLine>> {
        Ok(self
            .classifier
            .parse(self.buffer.text(), self.overrides.snapshot())?)
    }

    /// Replace the body from free typing
    ///
    /// Not recorded in history. The buffer becomes dirty until saved.
    pub fn edit_body(&mut self, text: impl Into<String>) -> Result<()> {
        if self.target.is_none() {
            return Err(EditorError::NoTarget);
        }
        self.buffer.edit(text);
        self.reparse();
        Ok(())
    }

    /// Persist the body of the open target
    pub async fn save_body(&mut self) -> Result<()> {
        let target = self.target.ok_or(EditorError::NoTarget)?;
        self.store.save_body(target, self.buffer.text()).await?;
        self.buffer.mark_saved();
        debug!("saved body of {target}");
        Ok(())
    }

    /// Apply an action and record it
    ///
    /// Returns `Ok(false)` without touching anything when the action would
    /// change nothing. A new action discards the redo stack.
    pub async fn commit(&mut self, action: HistoryAction) -> Result<bool> {
        if action.is_noop() {
            return Ok(false);
        }
        if matches!(action, HistoryAction::ReplaceBodyDraft { .. }) && self.target.is_none() {
            return Err(EditorError::NoTarget);
        }

        self.apply(&action, ActionSide::After).await?;
        debug!("committed: {}", action.description());
        self.history.push(HistoryEntry::new(action));
        Ok(true)
    }

    /// Revert the most recent action
    ///
    /// The entry moves to the redo stack only if reverting succeeded.
    pub async fn undo(&mut self) -> Result<bool> {
        let Some(entry) = self.history.peek_undo() else {
            return Ok(false);
        };
        let action = entry.action.clone();

        self.apply(&action, ActionSide::Before).await?;
        if let Some(entry) = self.history.pop_undo() {
            debug!("undid: {}", entry.description);
            self.history.push_redo(entry);
        }
        Ok(true)
    }

    /// Re-apply the most recently undone action
    pub async fn redo(&mut self) -> Result<bool> {
        let Some(entry) = self.history.peek_redo() else {
            return Ok(false);
        };
        let action = entry.action.clone();

        self.apply(&action, ActionSide::After).await?;
        if let Some(entry) = self.history.pop_redo() {
            debug!("redid: {}", entry.description);
            self.history.push_undo(entry);
        }
        Ok(true)
    }

    async fn apply(&mut self, action: &HistoryAction, side: ActionSide) -> Result<()> {
        let mut ctx = ActionContext {
            store: &self.store,
            overrides: &mut self.overrides,
            buffer: &mut self.buffer,
        };
        action.apply(side, &mut ctx).await?;
        if action.needs_reparse() {
            self.reparse();
        }
        Ok(())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.history.next_undo_description()
    }

    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.history.next_redo_description()
    }

    #[must_use]
    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    /// Block or unblock a filler term
    ///
    /// The term is trimmed, since it is matched against normalized lines.
    pub async fn set_blocked_term(&mut self, term: &str, enabled: bool) -> Result<bool> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(false);
        }
        let action = HistoryAction::SetFilterTerm {
            term: term.to_string(),
            before_enabled: self.overrides.is_blocked(term),
            after_enabled: enabled,
            reparse: true,
        };
        self.commit(action).await
    }

    /// Set (`Some`) or clear (`None`) the rule for a literal line
    pub async fn set_line_rule(
        &mut self,
        line_text: &str,
        classification: Option<Classification>,
    ) -> Result<bool> {
        let line_text = line_text.trim();
        if line_text.is_empty() {
            return Ok(false);
        }
        let action = HistoryAction::SetLineRule {
            line_text: line_text.to_string(),
            before: self.overrides.rule_for(line_text),
            after: classification,
            reparse: true,
        };
        self.commit(action).await
    }

    /// Fix the classification of a parsed row by ruling its source line
    pub async fn reclassify_row(
        &mut self,
        index: usize,
        classification: Classification,
    ) -> Result<bool> {
        let line_text = self.row(index)?.source_line.clone();
        self.set_line_rule(&line_text, Some(classification)).await
    }

    /// Split a raw body line in two at a character offset
    pub async fn split_line(&mut self, line_index: usize, char_offset: usize) -> Result<bool> {
        self.require_target()?;
        let after = transform::split_line(self.buffer.text(), line_index, char_offset)?;
        self.commit_body(after).await
    }

    /// Remove the raw lines a parsed row came from
    pub async fn delete_row(&mut self, index: usize) -> Result<bool> {
        self.require_target()?;
        let lines = self.row(index)?.source_lines.clone();
        let after = transform::delete_lines(self.buffer.text(), &lines)?;
        self.commit_body(after).await
    }

    /// Break `speaker: text` lines into a speaker line and a dialogue line
    pub async fn split_speakers(&mut self) -> Result<bool> {
        self.require_target()?;
        let after =
            transform::split_speaker_prefixes(self.buffer.text(), self.overrides.snapshot());
        self.commit_body(after).await
    }

    async fn commit_body(&mut self, after_body: String) -> Result<bool> {
        let action = HistoryAction::ReplaceBodyDraft {
            before_body: self.buffer.text().to_string(),
            after_body,
        };
        self.commit(action).await
    }

    /// Tag `[start, end)` of the displayed body
    ///
    /// Validates against the current text and the target's annotations,
    /// persists, then reloads the target's annotations.
    pub async fn add_annotation(
        &mut self,
        start: usize,
        end: usize,
        tag_id: RowId,
    ) -> Result<AnnotationId> {
        let set = self.annotations.as_ref().ok_or(EditorError::NoTarget)?;
        let new = set.prepare(self.buffer.text(), start, end, tag_id)?;
        let scope = new.scope;

        let id = self.store.insert_annotation(&new).await?;
        debug!("tagged [{start}, {end}) of {scope} with tag {tag_id} as {id}");

        let reloaded = self.store.load_annotations(scope).await;
        if let Some(set) = self.annotations.as_mut() {
            match reloaded {
                Ok(rows) => set.replace_all(rows),
                Err(err) => {
                    warn!("reloading annotations of {scope} failed, inserting locally: {err}");
                    set.insert(new.with_id(id));
                }
            }
        }
        Ok(id)
    }

    /// Remove an annotation
    ///
    /// Deleting an id that no longer exists is not an error.
    pub async fn delete_annotation(&mut self, id: AnnotationId) -> Result<()> {
        let scope = self
            .annotations
            .as_ref()
            .map(AnnotationSet::scope)
            .ok_or(EditorError::NoTarget)?;

        self.store.delete_annotation(id).await?;
        debug!("deleted annotation {id} of {scope}");

        let reloaded = self.store.load_annotations(scope).await;
        if let Some(set) = self.annotations.as_mut() {
            match reloaded {
                Ok(rows) => set.replace_all(rows),
                Err(err) => {
                    warn!("reloading annotations of {scope} failed, removing locally: {err}");
                    set.remove(id);
                }
            }
        }
        Ok(())
    }

    /// Segments of the current body with their tags
    #[must_use]
    pub fn render_body(&self) -> Vec<Segment> {
        render(self.buffer.text(), self.annotations())
    }

    /// Annotations whose range no longer fits the current body
    #[must_use]
    pub fn stale_annotations(&self) -> Vec<&TagAnnotation> {
        self.annotations
            .as_ref()
            .map_or_else(Vec::new, |set| set.stale(self.buffer.text()))
    }

    fn require_target(&self) -> Result<ScriptTarget> {
        self.target.ok_or(EditorError::NoTarget)
    }

    fn row(&self, index: usize) -> Result<&ParsedLine> {
        self.parsed
            .get(index)
            .ok_or(EditorError::RowNotFound { index })
    }

    fn reparse(&mut self) {
        self.parsed = self
            .classifier
            .classify(self.buffer.text(), self.overrides.snapshot());
    }
}
