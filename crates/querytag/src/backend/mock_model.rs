use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use crate::backend::{DenseLogits, TokenClassifier};
use crate::error::BoxError;
use crate::labels::{EntityKind, Label};
use crate::tokenizer::{EncodedBatch, EncodedRow, Tokenize};

pub const PAD_ID: u32 = 0;
pub const CLS_ID: u32 = 1;
pub const SEP_ID: u32 = 2;
/// A word `boom` makes the classifier return an error for its whole batch
pub const FAIL_ID: u32 = 98;
/// A word `panic` makes the classifier panic
pub const PANIC_ID: u32 = 99;
const LABEL_BASE: u32 = 100;

/// Splits on whitespace, then cuts every word into pieces of at most three
/// characters. The id of a piece encodes the label the mock classifier will
/// give it, picked from the first character of its word:
/// `t` type, `b` brand, a digit volume, `%` anywhere percent, otherwise `O`.
pub struct MockTokenizer;

impl MockTokenizer {
    fn word_kind(word: &str) -> EntityKind {
        match word.chars().next() {
            _ if word.contains('%') => EntityKind::Percent,
            Some('t') => EntityKind::Type,
            Some('b') => EntityKind::Brand,
            Some(c) if c.is_ascii_digit() => EntityKind::Volume,
            _ => EntityKind::Outside,
        }
    }

    fn inside(label: Label) -> Label {
        match label {
            Label::BeginType => Label::InsideType,
            Label::BeginBrand => Label::InsideBrand,
            Label::BeginVolume => Label::InsideVolume,
            Label::BeginPercent => Label::InsidePercent,
            other => other,
        }
    }

    fn encode(text: &str) -> EncodedRow {
        let mut row = EncodedRow::default();
        let mut push = |id: u32, offset: (usize, usize)| {
            row.ids.push(id);
            row.attention.push(1);
            row.offsets.push(offset);
        };

        push(CLS_ID, (0, 0));
        let chars: Vec<char> = text.chars().collect();
        let mut idx = 0;
        while idx < chars.len() {
            if chars[idx].is_whitespace() {
                idx += 1;
                continue;
            }
            let start = idx;
            while idx < chars.len() && !chars[idx].is_whitespace() {
                idx += 1;
            }
            let word: String = chars[start..idx].iter().collect();
            let begin = Self::word_kind(&word).begin_label();
            let mut piece_start = start;
            while piece_start < idx {
                let piece_end = (piece_start + 3).min(idx);
                let id = match word.as_str() {
                    "boom" => FAIL_ID,
                    "panic" => PANIC_ID,
                    _ if piece_start == start => LABEL_BASE + begin.id() as u32,
                    _ => LABEL_BASE + Self::inside(begin).id() as u32,
                };
                push(id, (piece_start, piece_end));
                piece_start = piece_end;
            }
        }
        push(SEP_ID, (0, 0));
        row
    }
}

impl Tokenize for MockTokenizer {
    fn tokenize(&self, texts: &[String], max_length: usize) -> Result<EncodedBatch, BoxError> {
        let rows = texts
            .iter()
            .map(|text| {
                let mut row = Self::encode(text);
                row.truncate(max_length);
                row
            })
            .collect();
        Ok(EncodedBatch::from_rows(rows, PAD_ID)?)
    }
}

/// A tokenizer that always fails.
pub struct BrokenTokenizer;

impl Tokenize for BrokenTokenizer {
    fn tokenize(&self, _texts: &[String], _max_length: usize) -> Result<EncodedBatch, BoxError> {
        Err("vocabulary missing".into())
    }
}

/// Emits one-hot logits decoded from the mock tokenizer's ids.
#[derive(Clone)]
pub struct MockClassifier {
    pub batch_sizes: Arc<Mutex<Vec<usize>>>,
    pub batches: Arc<Mutex<Vec<EncodedBatch>>>,
    pub labels: usize,
    pub delay: Duration,
    pub offline: Arc<AtomicBool>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            batch_sizes: Default::default(),
            batches: Default::default(),
            labels: Label::COUNT,
            delay: Duration::ZERO,
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_labels(mut self, labels: usize) -> Self {
        self.labels = labels;
        self
    }

    pub fn recorded_batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().clone()
    }
}

#[async_trait]
impl TokenClassifier for MockClassifier {
    type Logits = DenseLogits;

    async fn forward(&self, batch: &EncodedBatch) -> Result<DenseLogits, BoxError> {
        self.batch_sizes.lock().push(batch.rows());
        self.batches.lock().push(batch.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err("engine offline".into());
        }

        let ids = batch.flat_ids();
        if ids.contains(&PANIC_ID) {
            panic!("mock classifier asked to panic");
        }
        if ids.contains(&FAIL_ID) {
            return Err("mock classifier asked to fail".into());
        }

        let mut data = vec![0.0f32; ids.len() * self.labels];
        for (pos, id) in ids.iter().enumerate() {
            let label = id.checked_sub(LABEL_BASE).unwrap_or(0) as usize;
            data[pos * self.labels + label.min(self.labels - 1)] = 1.0;
        }
        Ok(DenseLogits::new(data, [batch.rows(), batch.seq_len(), self.labels])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Logits;

    #[test]
    fn test_mock_tokenizer_pieces_and_offsets() {
        let batch = MockTokenizer.tokenize(&["tomato 5l".to_string()], 64).unwrap();
        assert_eq!(
            batch.offsets()[0],
            vec![(0, 0), (0, 3), (3, 6), (7, 9), (0, 0)]
        );
        assert_eq!(
            batch.ids()[0],
            vec![
                CLS_ID,
                LABEL_BASE + Label::BeginType.id() as u32,
                LABEL_BASE + Label::InsideType.id() as u32,
                LABEL_BASE + Label::BeginVolume.id() as u32,
                SEP_ID,
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_classifier_one_hot() {
        let batch = MockTokenizer.tokenize(&["bread".to_string()], 64).unwrap();
        let logits = MockClassifier::new().forward(&batch).await.unwrap();
        assert_eq!(
            logits.argmax().unwrap(),
            vec![vec![0, Label::BeginBrand.id(), Label::InsideBrand.id(), 0]]
        );
    }
}
