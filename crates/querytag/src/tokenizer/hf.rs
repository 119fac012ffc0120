use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use parking_lot::Mutex;
use tokenizers::{Tokenizer, TruncationParams};
use crate::error::BoxError;
use super::{EncodedBatch, EncodedRow, Tokenize};

/// [`Tokenize`] over a Hugging Face fast tokenizer.
///
/// Offsets are reported in characters, not bytes, so they index the same
/// string the caller sent. Rows are truncated by the tokenizer itself, so the
/// text is cut and the special tokens of the post-processor template survive.
/// Rows are padded to the longest row with the tokenizer's padding id (`0` if
/// none is set).
pub struct HfTokenizer {
    inner: Tokenizer,
    pad_id: u32,
    /// Copies of `inner` configured to truncate at each requested length
    truncating: Mutex<HashMap<usize, Arc<Tokenizer>>>,
}

impl HfTokenizer {
    pub fn new(inner: Tokenizer) -> Self {
        let pad_id = inner.get_padding().map(|p| p.pad_id).unwrap_or(0);
        Self {
            inner,
            pad_id,
            truncating: Mutex::new(HashMap::new()),
        }
    }

    /// Loads a `tokenizer.json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BoxError> {
        let inner = Tokenizer::from_file(path)?;
        Ok(Self::new(inner))
    }

    fn truncating_at(&self, max_length: usize) -> Result<Arc<Tokenizer>, BoxError> {
        let mut truncating = self.truncating.lock();
        if let Some(tokenizer) = truncating.get(&max_length) {
            return Ok(tokenizer.clone());
        }

        let mut tokenizer = self.inner.clone();
        tokenizer.with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))?;
        let tokenizer = Arc::new(tokenizer);
        truncating.insert(max_length, tokenizer.clone());
        Ok(tokenizer)
    }
}

impl Tokenize for HfTokenizer {
    fn tokenize(&self, texts: &[String], max_length: usize) -> Result<EncodedBatch, BoxError> {
        let tokenizer = self.truncating_at(max_length)?;
        let encodings = tokenizer.encode_batch_char_offsets(texts.to_vec(), true)?;

        let rows = encodings
            .into_iter()
            .map(|encoding| {
                let mut row = EncodedRow {
                    ids: encoding.get_ids().to_vec(),
                    attention: encoding.get_attention_mask().to_vec(),
                    offsets: encoding.get_offsets().to_vec(),
                };
                // no-op unless the template alone exceeds max_length
                row.truncate(max_length);
                row
            })
            .collect();

        Ok(EncodedBatch::from_rows(rows, self.pad_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const CLS: u32 = 1;
    const SEP: u32 = 2;

    /// Word-level vocabulary with a `[CLS] $A [SEP]` template
    const TOKENIZER_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": {
            "type": "TemplateProcessing",
            "single": [
                { "SpecialToken": { "id": "[CLS]", "type_id": 0 } },
                { "Sequence": { "id": "A", "type_id": 0 } },
                { "SpecialToken": { "id": "[SEP]", "type_id": 0 } }
            ],
            "pair": [
                { "SpecialToken": { "id": "[CLS]", "type_id": 0 } },
                { "Sequence": { "id": "A", "type_id": 0 } },
                { "SpecialToken": { "id": "[SEP]", "type_id": 0 } },
                { "Sequence": { "id": "B", "type_id": 1 } },
                { "SpecialToken": { "id": "[SEP]", "type_id": 1 } }
            ],
            "special_tokens": {
                "[CLS]": { "id": "[CLS]", "ids": [1], "tokens": ["[CLS]"] },
                "[SEP]": { "id": "[SEP]", "ids": [2], "tokens": ["[SEP]"] }
            }
        },
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {
                "[PAD]": 0, "[CLS]": 1, "[SEP]": 2, "[UNK]": 3,
                "a": 4, "b": 5, "c": 6, "молоко": 7
            },
            "unk_token": "[UNK]"
        }
    }"#;

    fn word_level() -> HfTokenizer {
        HfTokenizer::new(Tokenizer::from_str(TOKENIZER_JSON).unwrap())
    }

    #[test]
    fn test_adds_special_tokens_with_char_offsets() {
        let batch = word_level().tokenize(&["молоко b".to_string()], 16).unwrap();
        assert_eq!(batch.ids()[0], vec![CLS, 7, 5, SEP]);
        assert_eq!(batch.attention()[0], vec![1, 1, 1, 1]);
        assert_eq!(batch.offsets()[0], vec![(0, 0), (0, 6), (7, 8), (0, 0)]);
    }

    #[test]
    fn test_truncation_keeps_closing_special_token() {
        let batch = word_level().tokenize(&["a b c".to_string()], 3).unwrap();
        assert_eq!(batch.ids()[0], vec![CLS, 4, SEP]);
        assert_eq!(batch.offsets()[0], vec![(0, 0), (0, 1), (0, 0)]);
    }

    #[test]
    fn test_lengths_do_not_leak_between_calls() {
        let tokenizer = word_level();
        let text = ["a b c".to_string()];

        assert_eq!(tokenizer.tokenize(&text, 4).unwrap().ids()[0], vec![CLS, 4, 5, SEP]);
        assert_eq!(tokenizer.tokenize(&text, 16).unwrap().ids()[0], vec![CLS, 4, 5, 6, SEP]);
        assert_eq!(tokenizer.tokenize(&text, 4).unwrap().ids()[0], vec![CLS, 4, 5, SEP]);
    }

    #[test]
    fn test_rows_padded_to_longest() {
        let texts = ["a".to_string(), "a b c".to_string()];
        let batch = word_level().tokenize(&texts, 16).unwrap();

        assert_eq!(batch.rows(), 2);
        assert_eq!(batch.seq_len(), 5);
        assert_eq!(batch.ids()[0], vec![CLS, 4, SEP, 0, 0]);
        assert_eq!(batch.attention()[0], vec![1, 1, 1, 0, 0]);
        assert_eq!(batch.offsets()[0][3..], [(0, 0), (0, 0)]);
        assert_eq!(batch.ids()[1], vec![CLS, 4, 5, 6, SEP]);
    }
}
