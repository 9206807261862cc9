//! Core error type for classification and body transforms
//!
//! # Error Philosophy
//!
//! - Use `thiserror` for structured error handling (no `anyhow` in the library)
//! - Carry enough context to show the user what went wrong
//! - Classification itself never fails; only callers that need a non-empty
//!   result or address raw lines produce errors

use core::fmt;
use thiserror::Error;

/// Main error type for scriptline core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Every input line was filtered out or blocked
    #[error("Nothing to parse: every line was filtered or blocked")]
    EmptyResult,

    /// A raw line index does not exist in the body
    #[error("Line index out of range: {index} (body has {count} lines)")]
    InvalidLineIndex { index: usize, count: usize },

    /// A character offset does not fall strictly inside a line
    #[error("Offset out of range: {offset} (line length: {length})")]
    InvalidOffset { offset: usize, length: usize },

    /// Classifier configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Create a configuration error from a message
    pub fn config<T: fmt::Display>(message: T) -> Self {
        Self::Config(message.to_string())
    }

    /// Check if the user can recover by editing input or overrides
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::EmptyResult | Self::InvalidLineIndex { .. } | Self::InvalidOffset { .. } => true,
            Self::Config(_) => false,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = core::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_message_is_user_facing() {
        assert_eq!(
            CoreError::EmptyResult.to_string(),
            "Nothing to parse: every line was filtered or blocked"
        );
    }

    #[test]
    fn recoverability() {
        assert!(CoreError::EmptyResult.is_recoverable());
        assert!(CoreError::InvalidOffset {
            offset: 9,
            length: 3
        }
        .is_recoverable());
        assert!(!CoreError::config("bad").is_recoverable());
    }
}
