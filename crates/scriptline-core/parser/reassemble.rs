//! Canonical text form of a parsed line list
//!
//! Dialogue is written as `speaker\ncontent`, captions as bare content, and
//! records are separated by one blank line. Re-classifying the output under
//! the same overrides yields the same kinds, speakers and contents.

use super::ast::ParsedLine;

/// Serialize parsed lines back into script text
///
/// # Example
///
/// ```rust
/// use scriptline_core::{classify, reassemble, Overrides};
///
/// let overrides = Overrides::new().with_known_speakers(["アリス"]);
/// let lines = classify("アリス\nこんにちは", &overrides);
/// assert_eq!(reassemble(&lines), "アリス\nこんにちは");
/// ```
#[must_use]
pub fn reassemble(lines: &[ParsedLine]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        if line.is_dialogue() {
            out.push_str(&line.speaker);
            out.push('\n');
        }
        out.push_str(&line.content);
    }
    out
}
