//! Editable body text of the open thread or episode

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether the buffer differs from what was last loaded or saved
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Clean,
    Dirty,
}

/// Body text plus the last persisted version of it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyBuffer {
    text: String,
    saved: String,
}

impl BodyBuffer {
    /// Buffer holding text that matches the store
    #[must_use]
    pub fn loaded(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            saved: text.clone(),
            text,
        }
    }

    /// Current text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text without going through history
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Replace the text as part of a history action
    pub fn replace_draft(&mut self, text: &str) {
        text.clone_into(&mut self.text);
    }

    /// Record that the current text is persisted
    pub fn mark_saved(&mut self) {
        self.saved.clone_from(&self.text);
    }

    #[must_use]
    pub fn state(&self) -> BufferState {
        if self.text == self.saved {
            BufferState::Clean
        } else {
            BufferState::Dirty
        }
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state() == BufferState::Dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_dirty_clean() {
        let mut buffer = BodyBuffer::loaded("アリス\nこんにちは");
        assert_eq!(buffer.state(), BufferState::Clean);

        buffer.edit("アリス\nこんばんは");
        assert!(buffer.is_dirty());

        buffer.mark_saved();
        assert_eq!(buffer.state(), BufferState::Clean);
    }

    #[test]
    fn editing_back_to_saved_text_is_clean() {
        let mut buffer = BodyBuffer::loaded("a");
        buffer.replace_draft("b");
        buffer.replace_draft("a");
        assert_eq!(buffer.state(), BufferState::Clean);
    }
}
