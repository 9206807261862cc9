//! Flatten a body and its annotations into display segments

use std::collections::BTreeMap;

use log::debug;
use scriptline_core::utils::{char_len, char_slice};

use super::{AnnotationId, TagAnnotation};
use crate::core::target::RowId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A tag shown on a segment
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationChip {
    pub id: AnnotationId,
    pub tag_id: RowId,
}

/// A run of body text, plain or carrying one or more tags
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Start character offset (inclusive)
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
    pub text: String,
    /// Empty for plain text
    pub annotations: Vec<AnnotationChip>,
}

impl Segment {
    /// Whether the segment carries any tag
    #[must_use]
    pub fn is_tagged(&self) -> bool {
        !self.annotations.is_empty()
    }
}

/// Render `body` as consecutive segments covering every character once
///
/// Annotations sharing a span are merged into one segment. Annotations that
/// no longer fit the body, or that overlap an earlier span, are skipped.
#[must_use]
pub fn render(body: &str, annotations: &[TagAnnotation]) -> Vec<Segment> {
    let length = char_len(body);
    let mut spans: BTreeMap<(usize, usize), Vec<AnnotationChip>> = BTreeMap::new();

    for annotation in annotations {
        if !annotation.is_within(length) {
            debug!(
                "skipping stale annotation {} [{}, {}) on body of {} chars",
                annotation.id, annotation.start_offset, annotation.end_offset, length
            );
            continue;
        }
        spans
            .entry((annotation.start_offset, annotation.end_offset))
            .or_default()
            .push(AnnotationChip {
                id: annotation.id,
                tag_id: annotation.tag_id,
            });
    }

    let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;

    for ((start, end), mut chips) in spans {
        if start < cursor {
            debug!("skipping overlapping span [{start}, {end}) before offset {cursor}");
            continue;
        }
        if start > cursor {
            push_segment(&mut segments, body, cursor, start, Vec::new());
        }
        chips.sort_by_key(|chip| chip.id);
        push_segment(&mut segments, body, start, end, chips);
        cursor = end;
    }

    if cursor < length {
        push_segment(&mut segments, body, cursor, length, Vec::new());
    }

    segments
}

fn push_segment(
    segments: &mut Vec<Segment>,
    body: &str,
    start: usize,
    end: usize,
    annotations: Vec<AnnotationChip>,
) {
    if let Some(text) = char_slice(body, start, end) {
        segments.push(Segment {
            start,
            end,
            text: text.to_string(),
            annotations,
        });
    }
}
