//! Line normalization and pre-classification filters
//!
//! Produces zero-copy [`SourceLine`] spans into the raw text, each tagged
//! with the raw line index it came from.

use crate::config::ClassifierConfig;
use crate::utils::split_raw_lines;

use super::overrides::Overrides;

/// A trimmed, non-empty line borrowed from the raw text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Zero-based index of the raw line
    pub index: usize,
    /// Trimmed text
    pub text: &'a str,
}

/// Split on any line ending, trim, and drop empty lines
#[must_use]
pub fn normalize(raw: &str) -> Vec<SourceLine<'_>> {
    split_raw_lines(raw)
        .into_iter()
        .enumerate()
        .filter_map(|(index, line)| {
            let text = line.trim();
            (!text.is_empty()).then_some(SourceLine { index, text })
        })
        .collect()
}

/// Check a normalized line against the viewer banner configuration
///
/// `position` is the line's position among normalized lines and
/// `in_header` whether every line before it was dropped. Substring banners
/// are only recognised in that leading header, within the first two lines;
/// once a line is kept the header is over.
#[must_use]
pub fn is_banner(
    line: &str,
    position: usize,
    in_header: bool,
    config: &ClassifierConfig,
) -> bool {
    if config.banner_lines.iter().any(|banner| banner == line) {
        return true;
    }
    if !in_header || position >= 2 {
        return false;
    }
    let lowered = line.to_lowercase();
    config
        .banner_substrings
        .iter()
        .any(|needle| lowered.contains(&needle.to_lowercase()))
}

/// Normalize and apply the banner and blocked-term filters
#[must_use]
pub fn filtered_lines<'a>(
    raw: &'a str,
    overrides: &Overrides,
    config: &ClassifierConfig,
) -> Vec<SourceLine<'a>> {
    let mut in_header = true;
    normalize(raw)
        .into_iter()
        .enumerate()
        .filter(|(position, line)| {
            if is_banner(line.text, *position, in_header, config) || overrides.is_blocked(line.text)
            {
                return false;
            }
            in_header = false;
            true
        })
        .map(|(_, line)| line)
        .collect()
}
