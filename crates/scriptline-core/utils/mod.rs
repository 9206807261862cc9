//! Shared helpers for the classifier and body transforms
//!
//! Line splitting must agree between the classifier and the transforms so
//! that `ParsedLine::source_lines` indices address the same raw lines.

pub mod errors;
pub mod hashers;

pub use errors::{CoreError, Result};
pub use hashers::{create_hash_map, create_hash_set};

/// Split text into raw lines, accepting `\r\n`, `\r` and `\n` line endings
///
/// Lines are returned untrimmed. Text ending in a line break yields a final
/// empty line, matching `str::split` on the normalized text.
///
/// # Example
///
/// ```rust
/// use scriptline_core::utils::split_raw_lines;
///
/// assert_eq!(split_raw_lines("a\r\nb\rc\n"), vec!["a", "b", "c", ""]);
/// ```
#[must_use]
pub fn split_raw_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    lines.push(&text[start..]);

    lines
}

/// Join raw lines back into a body using `\n`
#[must_use]
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.as_ref());
    }
    out
}

/// Number of Unicode scalar values in `text`
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the `char_offset`-th character, or `None` past the end
///
/// `char_offset == char_len(text)` maps to `text.len()`.
#[must_use]
pub fn byte_offset(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    text.char_indices()
        .map(|(idx, _)| idx)
        .chain(core::iter::once(text.len()))
        .nth(char_offset)
}

/// Slice `text` by character offsets `[start, end)`
#[must_use]
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let from = byte_offset(text, start)?;
    let to = byte_offset(text, end)?;
    text.get(from..to)
}
