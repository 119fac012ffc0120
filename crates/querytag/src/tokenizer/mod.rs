//! # Tokenizer contract
//!
//! The service does not tokenize text itself. It hands the ordered texts of a
//! batch to a [`Tokenize`] implementation and expects back an [`EncodedBatch`]
//! whose rows are in the same order as the texts.
//!
//! ## Feature Flags
//!
//! - `tokenizers`: enables [`HfTokenizer`], an adapter over a Hugging Face
//!   fast tokenizer loaded from a `tokenizer.json`.

use crate::error::{BatchError, BoxError};

#[cfg_attr(docsrs, doc(cfg(feature = "tokenizers")))]
#[cfg(feature = "tokenizers")]
mod hf;

#[cfg(feature = "tokenizers")]
pub use hf::HfTokenizer;

/// Maps texts to sub-token ids, attention masks and character offsets.
///
/// Implementations must return exactly one row per input text, in input
/// order, and truncate each row to at most `max_length` sub-tokens.
pub trait Tokenize: Send + Sync + 'static {
    fn tokenize(&self, texts: &[String], max_length: usize) -> Result<EncodedBatch, BoxError>;
}

/// One tokenized text before padding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedRow {
    pub ids: Vec<u32>,
    pub attention: Vec<u32>,
    /// `(start, end)` character offsets into the text, aligned with `ids`.
    /// Special tokens carry a zero-width offset.
    pub offsets: Vec<(usize, usize)>,
}

impl EncodedRow {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Keeps at most the first `max_length` positions.
    pub fn truncate(&mut self, max_length: usize) {
        self.ids.truncate(max_length);
        self.attention.truncate(max_length);
        self.offsets.truncate(max_length);
    }
}

/// A rectangular, padded batch of tokenized texts.
///
/// Row `i` belongs to the `i`-th text handed to the tokenizer; every row has
/// [`seq_len`](EncodedBatch::seq_len) positions. Padding positions carry
/// attention `0` and offset `(0, 0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    ids: Vec<Vec<u32>>,
    attention: Vec<Vec<u32>>,
    offsets: Vec<Vec<(usize, usize)>>,
    seq_len: usize,
}

impl EncodedBatch {
    /// Pads rows to the longest one.
    pub fn from_rows(rows: Vec<EncodedRow>, pad_id: u32) -> Result<Self, BatchError> {
        for (idx, row) in rows.iter().enumerate() {
            if row.attention.len() != row.ids.len() || row.offsets.len() != row.ids.len() {
                return Err(BatchError::Shape(format!(
                    "row {idx}: {} ids, {} mask positions, {} offsets",
                    row.ids.len(),
                    row.attention.len(),
                    row.offsets.len()
                )));
            }
        }

        let seq_len = rows.iter().map(EncodedRow::len).max().unwrap_or(0);
        let mut ids = Vec::with_capacity(rows.len());
        let mut attention = Vec::with_capacity(rows.len());
        let mut offsets = Vec::with_capacity(rows.len());
        for mut row in rows {
            let padding = seq_len - row.len();
            row.ids.extend(std::iter::repeat_n(pad_id, padding));
            row.attention.extend(std::iter::repeat_n(0, padding));
            row.offsets.extend(std::iter::repeat_n((0, 0), padding));
            ids.push(row.ids);
            attention.push(row.attention);
            offsets.push(row.offsets);
        }

        Ok(Self { ids, attention, offsets, seq_len })
    }

    /// Number of rows (the batch dimension)
    pub fn rows(&self) -> usize {
        self.ids.len()
    }

    /// Number of positions per row (the sequence dimension)
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    pub fn ids(&self) -> &[Vec<u32>] {
        &self.ids
    }

    pub fn attention(&self) -> &[Vec<u32>] {
        &self.attention
    }

    pub fn offsets(&self) -> &[Vec<(usize, usize)>] {
        &self.offsets
    }

    /// Ids in row-major order, for building a `(rows, seq_len)` tensor.
    pub fn flat_ids(&self) -> Vec<u32> {
        self.ids.iter().flatten().copied().collect()
    }

    /// Attention mask in row-major order.
    pub fn flat_attention(&self) -> Vec<u32> {
        self.attention.iter().flatten().copied().collect()
    }
}
