//! History management for undo/redo of classification edits
//!
//! Linear history with configurable depth and memory limits. Entries hold a
//! [`HistoryAction`] carrying both the before and after state, so undo and
//! redo are the same operation applied to opposite sides.
//!
//! The stack itself never touches persistence. The session peeks an entry,
//! applies it, and only moves it between stacks once the store accepted the
//! change.

use std::collections::VecDeque;
use std::time::Instant;

use crate::commands::HistoryAction;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single entry in the undo/redo history
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The action that was committed
    pub action: HistoryAction,

    /// Label for undo/redo menus
    pub description: String,

    /// When the action was committed
    pub timestamp: Instant,

    /// Memory usage of this entry (for capacity management)
    pub memory_usage: usize,
}

impl HistoryEntry {
    /// Create a new history entry
    #[must_use]
    pub fn new(action: HistoryAction) -> Self {
        let description = action.description();
        let memory_usage = action.memory_usage() + description.len();

        Self {
            action,
            description,
            timestamp: Instant::now(),
            memory_usage,
        }
    }
}

/// Configuration for undo stack behavior
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoStackConfig {
    /// Maximum number of undo entries to keep
    pub max_entries: usize,

    /// Maximum memory usage in bytes (0 = unlimited)
    pub max_memory: usize,
}

impl Default for UndoStackConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            max_memory: 4 * 1024 * 1024,
        }
    }
}

/// Snapshot of the stack sizes
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStats {
    pub undo_count: usize,
    pub redo_count: usize,
    pub memory_usage: usize,
}

/// Undo/redo stack
///
/// Most recent entries are at the front of each deque; the oldest undo
/// entries are evicted from the back when a limit is exceeded.
#[derive(Debug, Default)]
pub struct UndoStack {
    config: UndoStackConfig,
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    current_memory: usize,
}

impl UndoStack {
    /// Create a new undo stack with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(UndoStackConfig::default())
    }

    /// Create a new undo stack with custom configuration
    #[must_use]
    pub fn with_config(config: UndoStackConfig) -> Self {
        Self {
            config,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            current_memory: 0,
        }
    }

    /// Configuration of this stack
    #[must_use]
    pub const fn config(&self) -> &UndoStackConfig {
        &self.config
    }

    /// Push a freshly committed entry
    ///
    /// Clears the redo stack: a new action invalidates undone ones.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.clear_redo_stack();
        self.push_undo(entry);
    }

    /// Push a redone entry back onto the undo stack, keeping the redo stack
    pub fn push_undo(&mut self, entry: HistoryEntry) {
        self.current_memory += entry.memory_usage;
        self.undo_stack.push_front(entry);
        self.enforce_limits();
    }

    /// Most recent undo entry
    #[must_use]
    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.undo_stack.front()
    }

    /// Most recent redo entry
    #[must_use]
    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.redo_stack.front()
    }

    /// Pop the most recent entry from the undo stack
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.undo_stack.pop_front()?;
        self.current_memory -= entry.memory_usage;
        Some(entry)
    }

    /// Push an entry onto the redo stack
    pub fn push_redo(&mut self, entry: HistoryEntry) {
        self.current_memory += entry.memory_usage;
        self.redo_stack.push_front(entry);
    }

    /// Pop an entry from the redo stack
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo_stack.pop_front()?;
        self.current_memory -= entry.memory_usage;
        Some(entry)
    }

    /// Check if undo is available
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Get description of the next undo operation
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack
            .front()
            .map(|entry| entry.description.as_str())
    }

    /// Get description of the next redo operation
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack
            .front()
            .map(|entry| entry.description.as_str())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_memory = 0;
    }

    /// Current sizes
    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            memory_usage: self.current_memory,
        }
    }

    fn clear_redo_stack(&mut self) {
        for entry in self.redo_stack.drain(..) {
            self.current_memory -= entry.memory_usage;
        }
    }

    fn enforce_limits(&mut self) {
        while self.undo_stack.len() > self.config.max_entries {
            if let Some(entry) = self.undo_stack.pop_back() {
                self.current_memory -= entry.memory_usage;
            }
        }

        // Keep at least the newest entry, however large
        while self.config.max_memory > 0
            && self.current_memory > self.config.max_memory
            && self.undo_stack.len() > 1
        {
            if let Some(entry) = self.undo_stack.pop_back() {
                self.current_memory -= entry.memory_usage;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptline_core::Classification;

    fn term(name: &str) -> HistoryEntry {
        HistoryEntry::new(HistoryAction::SetFilterTerm {
            term: name.to_string(),
            before_enabled: false,
            after_enabled: true,
            reparse: true,
        })
    }

    #[test]
    fn push_clears_redo() {
        let mut stack = UndoStack::new();
        stack.push(term("a"));
        stack.push(term("b"));

        let entry = stack.pop_undo().unwrap();
        stack.push_redo(entry);
        assert!(stack.can_redo());

        stack.push(term("c"));
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_count(), 2);
    }

    #[test]
    fn push_undo_keeps_redo() {
        let mut stack = UndoStack::new();
        stack.push(term("a"));
        stack.push(term("b"));
        for _ in 0..2 {
            let entry = stack.pop_undo().unwrap();
            stack.push_redo(entry);
        }

        let entry = stack.pop_redo().unwrap();
        stack.push_undo(entry);
        assert_eq!(stack.stats().undo_count, 1);
        assert_eq!(stack.stats().redo_count, 1);
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let mut stack = UndoStack::with_config(UndoStackConfig {
            max_entries: 2,
            max_memory: 0,
        });
        stack.push(term("a"));
        stack.push(term("b"));
        stack.push(term("c"));

        assert_eq!(stack.undo_count(), 2);
        assert_eq!(stack.pop_undo().unwrap().description, "Block \"c\"");
        assert_eq!(stack.pop_undo().unwrap().description, "Block \"b\"");
        assert!(stack.pop_undo().is_none());
        assert_eq!(stack.stats().memory_usage, 0);
    }

    #[test]
    fn memory_limit_keeps_newest_entry() {
        let mut stack = UndoStack::with_config(UndoStackConfig {
            max_entries: 10,
            max_memory: 1,
        });
        stack.push(term("a"));
        stack.push(term("b"));
        assert_eq!(stack.undo_count(), 1);
    }

    #[test]
    fn descriptions_track_the_fronts() {
        let mut stack = UndoStack::new();
        assert_eq!(stack.next_undo_description(), None);
        stack.push(HistoryEntry::new(HistoryAction::SetLineRule {
            line_text: "夜".into(),
            before: None,
            after: Some(Classification::Location),
            reparse: true,
        }));
        assert_eq!(
            stack.next_undo_description(),
            Some("Mark \"夜\" as location")
        );

        stack.clear();
        assert_eq!(stack.stats(), HistoryStats::default());
    }
}
