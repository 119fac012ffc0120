//! # Span merging
//!
//! Turns per-sub-token predictions into the entities returned to callers.
//!
//! The model labels sub-tokens, not words. Sub-tokens cut from the same word
//! carry touching character offsets, while distinct words are always separated
//! by at least one character, so a run of touching offsets is one entity. The
//! run keeps the label of its first sub-token even if the model flips the tag
//! mid-word.

use serde::{Deserialize, Serialize};
use crate::error::BatchError;
use crate::labels::{EntityKind, Label};

/// A labelled character interval `[start, end)` for one sub-token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSpan {
    pub start: usize,
    pub end: usize,
    pub label: Label,
}

impl RawSpan {
    pub fn new(start: usize, end: usize, label: Label) -> Self {
        Self { start, end, label }
    }
}

impl From<&Entity> for RawSpan {
    fn from(entity: &Entity) -> Self {
        Self::new(entity.start, entity.end, entity.entity.begin_label())
    }
}

/// A merged, caller-facing span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "start_index")]
    pub start: usize,
    #[serde(rename = "end_index")]
    pub end: usize,
    pub entity: EntityKind,
}

impl Entity {
    pub fn new(start: usize, end: usize, entity: EntityKind) -> Self {
        Self { start, end, entity }
    }
}

/// Builds the raw spans of one batch row.
///
/// `label_ids` is the argmax label per sub-token position and `offsets` the
/// tokenizer's character offsets for the same row. Zero-width offsets mark
/// special and padding tokens and are dropped.
pub fn spans_from_row(
    label_ids: &[usize],
    offsets: &[(usize, usize)],
) -> Result<Vec<RawSpan>, BatchError> {
    if label_ids.len() != offsets.len() {
        return Err(BatchError::Shape(format!(
            "{} label positions for {} offsets",
            label_ids.len(),
            offsets.len()
        )));
    }

    let mut spans = Vec::with_capacity(offsets.len());
    for (&label_id, &(start, end)) in label_ids.iter().zip(offsets) {
        if start == end {
            continue;
        }
        let label = Label::from_id(label_id).ok_or(BatchError::UnknownLabel(label_id))?;
        spans.push(RawSpan::new(start, end, label));
    }
    Ok(spans)
}

/// Coalesces byte-adjacent spans into entities.
pub fn merge_spans(spans: &[RawSpan]) -> Vec<Entity> {
    let Some((first, rest)) = spans.split_first() else {
        return vec![];
    };

    let mut merged = Vec::new();
    let mut current = *first;
    for span in rest {
        if span.start == current.end {
            current.end = span.end;
        } else {
            merged.push(Entity::new(current.start, current.end, current.label.kind()));
            current = *span;
        }
    }
    merged.push(Entity::new(current.start, current.end, current.label.kind()));
    merged
}
