use std::fmt;
use crate::error::{BatchError, BoxError};
use super::constant::{BATCH_DIM, LABEL_DIM, SEQ_DIM};
use super::Logits;

/// Row-major `f32` logits held in a flat vector.
///
/// Useful for engines that hand back plain buffers, e.g. an ONNX session
/// output copied out of its native tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseLogits {
    data: Vec<f32>,
    shape: [usize; 3],
}

impl DenseLogits {
    /// Wraps `data` laid out as `shape = (batch, sub-tokens, labels)`.
    pub fn new(data: Vec<f32>, shape: [usize; 3]) -> Result<Self, BatchError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(BatchError::Shape(format!(
                "{} logits for shape {:?}",
                data.len(),
                shape
            )));
        }
        Ok(Self { data, shape })
    }

    /// Builds logits from nested `[batch][sub-token][label]` vectors.
    pub fn from_nested(rows: Vec<Vec<Vec<f32>>>) -> Result<Self, BatchError> {
        let batch = rows.len();
        let seq = rows.first().map(Vec::len).unwrap_or(0);
        let labels = rows
            .first()
            .and_then(|row| row.first())
            .map(Vec::len)
            .unwrap_or(0);

        let mut data = Vec::with_capacity(batch * seq * labels);
        for (b, row) in rows.into_iter().enumerate() {
            if row.len() != seq {
                return Err(BatchError::Shape(format!("row {b} has {} positions, expected {seq}", row.len())));
            }
            for (s, scores) in row.into_iter().enumerate() {
                if scores.len() != labels {
                    return Err(BatchError::Shape(format!(
                        "row {b} position {s} has {} scores, expected {labels}",
                        scores.len()
                    )));
                }
                data.extend(scores);
            }
        }
        Self::new(data, [batch, seq, labels])
    }
}

impl fmt::Display for DenseLogits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DenseLogits({:?})", self.shape)
    }
}

impl Logits for DenseLogits {
    fn shape(&self) -> Vec<usize> {
        self.shape.to_vec()
    }

    fn argmax(&self) -> Result<Vec<Vec<usize>>, BoxError> {
        let (batch, seq, labels) = (self.shape[BATCH_DIM], self.shape[SEQ_DIM], self.shape[LABEL_DIM]);
        if labels == 0 {
            return Err(BatchError::Shape("logits have an empty label dimension".into()).into());
        }
        if seq == 0 {
            return Ok(vec![Vec::new(); batch]);
        }

        let mut out = Vec::with_capacity(batch);
        for row in self.data.chunks_exact(seq * labels).take(batch) {
            let ids = row
                .chunks_exact(labels)
                .map(|scores| {
                    // first maximum wins on ties; NaN never wins
                    let mut best = 0;
                    for (idx, score) in scores.iter().enumerate().skip(1) {
                        if *score > scores[best] || scores[best].is_nan() {
                            best = idx;
                        }
                    }
                    best
                })
                .collect();
            out.push(ids);
        }
        Ok(out)
    }
}
