//! Output records of the classifier and the rule vocabulary

use core::fmt;
use core::str::FromStr;

use crate::utils::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classification a line rule can force onto one literal line
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Classification {
    /// The line is a speaker label
    Speaker,
    /// The line is a stage direction
    Direction,
    /// The line is a location caption
    Location,
}

impl Classification {
    /// Stable lowercase name used in storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Speaker => "speaker",
            Self::Direction => "direction",
            Self::Location => "location",
        }
    }

    /// Whether this rule excludes the line from ever being a speaker
    #[must_use]
    pub const fn is_caption(self) -> bool {
        matches!(self, Self::Direction | Self::Location)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "speaker" => Ok(Self::Speaker),
            "direction" => Ok(Self::Direction),
            "location" => Ok(Self::Location),
            other => Err(CoreError::config(format!("unknown classification '{other}'"))),
        }
    }
}

/// Kind of a parsed output line
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Dialogue spoken by `speaker`
    Dialogue,
    /// Stage direction
    Direction,
    /// Location caption
    Location,
}

/// A literal-line override as stored in the backing store
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineRule {
    /// Exact normalized line text (case-sensitive)
    pub line_text: String,
    /// Forced classification
    pub classification: Classification,
}

impl LineRule {
    /// Create a new rule
    pub fn new(line_text: impl Into<String>, classification: Classification) -> Self {
        Self {
            line_text: line_text.into(),
            classification,
        }
    }
}

/// One typed output unit of the classifier
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Line kind
    pub kind: LineKind,

    /// Speaker label, empty unless `kind` is `Dialogue`
    pub speaker: String,

    /// Dialogue text or caption text
    pub content: String,

    /// Line that produced `speaker` (dialogue) or `content` (captions)
    pub source_line: String,

    /// Rule attached to `source_line` when the line was classified
    pub source_rule: Option<Classification>,

    /// Zero-based raw body line indices consumed by this record
    pub source_lines: Vec<usize>,
}

impl ParsedLine {
    /// Create a dialogue line
    pub fn dialogue(
        speaker: impl Into<String>,
        content: impl Into<String>,
        source_rule: Option<Classification>,
        source_lines: Vec<usize>,
    ) -> Self {
        let speaker = speaker.into();
        Self {
            kind: LineKind::Dialogue,
            source_line: speaker.clone(),
            speaker,
            content: content.into(),
            source_rule,
            source_lines,
        }
    }

    /// Create a direction or location line
    pub fn caption(
        kind: LineKind,
        content: impl Into<String>,
        source_rule: Option<Classification>,
        source_lines: Vec<usize>,
    ) -> Self {
        let content = content.into();
        Self {
            kind,
            speaker: String::new(),
            source_line: content.clone(),
            content,
            source_rule,
            source_lines,
        }
    }

    /// Check if this is a dialogue line
    #[must_use]
    pub fn is_dialogue(&self) -> bool {
        self.kind == LineKind::Dialogue
    }
}
