//! Classifier configuration
//!
//! Controls the boilerplate filter, how speaker labels are recognised and
//! whether unlabelled text is assumed to alternate speaker/line.

use crate::utils::{CoreError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the classifier decides that a line is a plausible speaker label
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeakerPolicy {
    /// Only a `Speaker` rule or known-speaker membership qualifies
    #[default]
    Explicit,
    /// Additionally accept short lines without whitespace, punctuation or digits-only
    Heuristic,
}

/// Configuration for [`LineClassifier`](crate::LineClassifier)
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Case-insensitive substrings marking a viewer banner in the first two lines
    pub banner_substrings: Vec<String>,

    /// Lines dropped wherever they appear (viewer UI chrome)
    pub banner_lines: Vec<String>,

    /// Speaker label recognition policy
    pub speaker_policy: SpeakerPolicy,

    /// Maximum characters for a heuristic speaker label
    pub max_heuristic_speaker_chars: usize,

    /// Pair two unlabelled lines as speaker/dialogue when nothing better applies
    pub assume_alternation: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            banner_substrings: vec![
                "script viewer".to_string(),
                "scenario viewer".to_string(),
                "exported by".to_string(),
                "シナリオビューア".to_string(),
                "スクリプトビューア".to_string(),
            ],
            banner_lines: vec!["機能一覧".to_string(), "メニュー".to_string()],
            speaker_policy: SpeakerPolicy::Explicit,
            max_heuristic_speaker_chars: 12,
            assume_alternation: true,
        }
    }
}

impl ClassifierConfig {
    /// Use the heuristic speaker policy
    #[must_use]
    pub fn heuristic(mut self) -> Self {
        self.speaker_policy = SpeakerPolicy::Heuristic;
        self
    }

    /// Disable the speaker/dialogue alternation fallback
    #[must_use]
    pub fn without_alternation(mut self) -> Self {
        self.assume_alternation = false;
        self
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] for a zero heuristic length or an empty
    /// banner substring (which would match every line).
    pub fn validate(&self) -> Result<()> {
        if self.speaker_policy == SpeakerPolicy::Heuristic && self.max_heuristic_speaker_chars == 0
        {
            return Err(CoreError::config(
                "max_heuristic_speaker_chars must be positive for the heuristic policy",
            ));
        }
        if self.banner_substrings.iter().any(|s| s.trim().is_empty()) {
            return Err(CoreError::config("banner substrings must not be blank"));
        }
        Ok(())
    }
}
