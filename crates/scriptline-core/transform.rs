//! Body transforms behind the editor's structural actions
//!
//! All functions take the whole body and return a new body; they never edit
//! in place so the caller can keep the before/after snapshots for undo.
//! Output always uses `\n` line endings. Line indices are raw line indices
//! as produced by [`split_raw_lines`], the same indices found in
//! [`ParsedLine::source_lines`](crate::ParsedLine::source_lines).

use log::debug;

use crate::parser::{Classification, Overrides};
use crate::utils::{byte_offset, char_len, join_lines, split_raw_lines, CoreError, Result};

/// Split one raw line in two at a character offset
///
/// Used to fix a line where the speaker label and the dialogue were pasted
/// onto the same line. Whitespace at the cut is trimmed on both sides.
///
/// # Errors
///
/// Returns [`CoreError::InvalidLineIndex`] for a missing line and
/// [`CoreError::InvalidOffset`] unless `0 < char_offset < line length`.
///
/// # Example
///
/// ```rust
/// use scriptline_core::transform::split_line;
///
/// let body = split_line("アリス こんにちは\nボブ", 0, 3)?;
/// assert_eq!(body, "アリス\nこんにちは\nボブ");
/// # Ok::<(), scriptline_core::CoreError>(())
/// ```
pub fn split_line(body: &str, line_index: usize, char_offset: usize) -> Result<String> {
    let lines = split_raw_lines(body);
    let line = *lines.get(line_index).ok_or(CoreError::InvalidLineIndex {
        index: line_index,
        count: lines.len(),
    })?;

    let length = char_len(line);
    if char_offset == 0 || char_offset >= length {
        return Err(CoreError::InvalidOffset {
            offset: char_offset,
            length,
        });
    }
    let cut = byte_offset(line, char_offset).ok_or(CoreError::InvalidOffset {
        offset: char_offset,
        length,
    })?;

    let (head, tail) = line.split_at(cut);
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    out.extend_from_slice(&lines[..line_index]);
    out.push(head.trim_end());
    out.push(tail.trim_start());
    out.extend_from_slice(&lines[line_index + 1..]);

    Ok(join_lines(&out))
}

/// Remove raw lines by index
///
/// Duplicate indices are ignored.
///
/// # Errors
///
/// Returns [`CoreError::InvalidLineIndex`] if any index is out of range; the
/// body is not modified in that case.
pub fn delete_lines(body: &str, indices: &[usize]) -> Result<String> {
    let lines = split_raw_lines(body);
    if let Some(&bad) = indices.iter().find(|&&i| i >= lines.len()) {
        return Err(CoreError::InvalidLineIndex {
            index: bad,
            count: lines.len(),
        });
    }

    let kept: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !indices.contains(i))
        .map(|(_, line)| *line)
        .collect();

    Ok(join_lines(&kept))
}

/// Split `Name: line` style rows into a speaker line and a dialogue line
///
/// A line qualifies when it starts with a known speaker followed by `:`,
/// `：`, whitespace or `「`. The separator is dropped except `「`, which
/// belongs to the dialogue. Speakers ruled `Direction`/`Location` are never
/// split off, and the longest matching name wins.
#[must_use]
pub fn split_speaker_prefixes(body: &str, overrides: &Overrides) -> String {
    let mut names: Vec<&str> = overrides
        .known_speakers()
        .filter(|name| {
            !name.is_empty()
                && !overrides
                    .rule_for(name)
                    .is_some_and(Classification::is_caption)
        })
        .collect();
    names.sort_by(|a, b| char_len(b).cmp(&char_len(a)).then_with(|| a.cmp(b)));

    let mut out: Vec<&str> = Vec::new();
    let mut split_count = 0usize;
    for line in split_raw_lines(body) {
        match split_prefixed(line.trim(), &names) {
            Some((speaker, dialogue)) => {
                out.push(speaker);
                out.push(dialogue);
                split_count += 1;
            }
            None => out.push(line),
        }
    }

    debug!("speaker split produced {split_count} new line pairs");
    join_lines(&out)
}

fn split_prefixed<'a>(line: &'a str, names: &[&'a str]) -> Option<(&'a str, &'a str)> {
    names.iter().find_map(|&name| {
        let rest = line.strip_prefix(name)?;
        let separator = rest.chars().next()?;
        let dialogue = match separator {
            ':' | '：' => rest[separator.len_utf8()..].trim(),
            c if c.is_whitespace() => rest.trim(),
            '「' => rest,
            _ => return None,
        };
        (!dialogue.is_empty()).then_some((name, dialogue))
    })
}
