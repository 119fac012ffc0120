use candle_core::{D, DType, Device, Tensor};
use crate::error::{BatchError, BoxError};
use crate::tokenizer::EncodedBatch;
use super::constant::LABEL_DIM;
use super::Logits;

impl Logits for Tensor {
    fn shape(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    fn argmax(&self) -> Result<Vec<Vec<usize>>, BoxError> {
        if self.rank() != LABEL_DIM + 1 {
            return Err(BatchError::Shape(format!("expected rank 3 logits, got {:?}", self.dims())).into());
        }
        let ids = Tensor::argmax(self, D::Minus1)?
            .to_dtype(DType::U32)?
            .to_vec2::<u32>()?;
        Ok(ids
            .into_iter()
            .map(|row| row.into_iter().map(|id| id as usize).collect())
            .collect())
    }
}

/// Builds `(rows, seq_len)` `u32` tensors of ids and attention mask for `batch`.
pub fn batch_tensors(batch: &EncodedBatch, device: &Device) -> candle_core::Result<(Tensor, Tensor)> {
    let shape = (batch.rows(), batch.seq_len());
    let ids = Tensor::from_vec(batch.flat_ids(), shape, device)?;
    let attention = Tensor::from_vec(batch.flat_attention(), shape, device)?;
    Ok((ids, attention))
}
