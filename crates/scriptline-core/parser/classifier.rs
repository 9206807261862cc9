//! Cursor-walk classifier turning filtered lines into typed records
//!
//! Each step consumes one line (a caption) or two lines (a speaker label and
//! its dialogue). Explicit rules are consulted before any heuristic, and a
//! line ruled `Direction` or `Location` never becomes a speaker.

use log::trace;

use super::ast::{Classification, LineKind, ParsedLine};
use super::normalize::{filtered_lines, SourceLine};
use super::overrides::Overrides;
use crate::config::{ClassifierConfig, SpeakerPolicy};
use crate::utils::{CoreError, Result};

/// Script-line classifier with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct LineClassifier {
    config: ClassifierConfig,
}

impl LineClassifier {
    /// Create a classifier with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the configuration does not validate.
    pub fn with_config(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify raw text into typed lines
    ///
    /// Pure and deterministic; an input made only of filtered or blocked
    /// lines yields an empty vector.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scriptline_core::{Classification, LineClassifier, LineKind, LineRule, Overrides};
    ///
    /// let overrides = Overrides::new()
    ///     .with_known_speakers(["アリス"])
    ///     .with_line_rules([LineRule::new("効果音: ドア", Classification::Direction)]);
    /// let lines = LineClassifier::new().classify("効果音: ドア\nアリス\nこんにちは", &overrides);
    ///
    /// assert_eq!(lines[0].kind, LineKind::Direction);
    /// assert_eq!(lines[1].speaker, "アリス");
    /// ```
    #[must_use]
    pub fn classify(&self, raw: &str, overrides: &Overrides) -> Vec<ParsedLine> {
        let lines = filtered_lines(raw, overrides, &self.config);
        let mut out = Vec::with_capacity(lines.len() / 2 + 1);
        let mut cursor = 0;

        while cursor < lines.len() {
            let current = lines[cursor];
            let rule = overrides.rule_for(current.text);

            if let Some(kind) = rule.and_then(caption_kind) {
                out.push(ParsedLine::caption(kind, current.text, rule, vec![current.index]));
                cursor += 1;
                continue;
            }

            let next = lines.get(cursor + 1).copied();
            let usable_next = next.filter(|n| !is_caption_ruled(n, overrides));

            if self.is_speaker_label(current.text, overrides) {
                if let Some(n) = usable_next {
                    out.push(dialogue(current, n, rule));
                    cursor += 2;
                    continue;
                }
            }

            if next.is_some_and(|n| self.is_speaker_label(n.text, overrides)) {
                out.push(direction(current, rule));
                cursor += 1;
                continue;
            }

            if self.config.assume_alternation {
                if let Some(n) = usable_next {
                    trace!("pairing unlabelled lines {} and {}", current.index, n.index);
                    out.push(dialogue(current, n, rule));
                    cursor += 2;
                    continue;
                }
            }

            out.push(direction(current, rule));
            cursor += 1;
        }

        out
    }

    /// Classify and treat an empty result as an error
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyResult`] when nothing survives filtering.
    pub fn parse(&self, raw: &str, overrides: &Overrides) -> Result<Vec<ParsedLine>> {
        let lines = self.classify(raw, overrides);
        if lines.is_empty() {
            return Err(CoreError::EmptyResult);
        }
        Ok(lines)
    }

    /// Whether `line` is a plausible speaker label under the active policy
    #[must_use]
    pub fn is_speaker_label(&self, line: &str, overrides: &Overrides) -> bool {
        match overrides.rule_for(line) {
            Some(Classification::Speaker) => true,
            Some(_) => false,
            None => {
                overrides.is_known_speaker(line)
                    || (self.config.speaker_policy == SpeakerPolicy::Heuristic
                        && looks_like_name(line, self.config.max_heuristic_speaker_chars))
            }
        }
    }
}

/// Classify with the default configuration
#[must_use]
pub fn classify(raw: &str, overrides: &Overrides) -> Vec<ParsedLine> {
    LineClassifier::new().classify(raw, overrides)
}

/// Classify with an explicit configuration
///
/// # Errors
///
/// Returns [`crate::CoreError::Config`] if `config` fails validation.
pub fn classify_with_config(
    raw: &str,
    overrides: &Overrides,
    config: ClassifierConfig,
) -> Result<Vec<ParsedLine>> {
    Ok(LineClassifier::with_config(config)?.classify(raw, overrides))
}

fn caption_kind(rule: Classification) -> Option<LineKind> {
    match rule {
        Classification::Direction => Some(LineKind::Direction),
        Classification::Location => Some(LineKind::Location),
        Classification::Speaker => None,
    }
}

fn is_caption_ruled(line: &SourceLine<'_>, overrides: &Overrides) -> bool {
    overrides
        .rule_for(line.text)
        .is_some_and(Classification::is_caption)
}

fn dialogue(
    speaker: SourceLine<'_>,
    content: SourceLine<'_>,
    rule: Option<Classification>,
) -> ParsedLine {
    ParsedLine::dialogue(
        speaker.text,
        content.text,
        rule,
        vec![speaker.index, content.index],
    )
}

fn direction(line: SourceLine<'_>, rule: Option<Classification>) -> ParsedLine {
    ParsedLine::caption(LineKind::Direction, line.text, rule, vec![line.index])
}

/// Short, whitespace-free, punctuation-free, not purely numeric
fn looks_like_name(line: &str, max_chars: usize) -> bool {
    let count = line.chars().count();
    count > 0
        && count <= max_chars
        && !line
            .chars()
            .any(|c| c.is_whitespace() || is_punctuation(c))
        && !line.chars().all(char::is_numeric)
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '。' | '、'
                | '！'
                | '？'
                | '「'
                | '」'
                | '『'
                | '』'
                | '（'
                | '）'
                | '…'
                | '：'
                | '；'
                | '〜'
                | '―'
        )
}
