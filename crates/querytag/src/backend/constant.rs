//! # Constants with reserved meanings for logits tensors

/// The `0th` dimension of logits is the batch dimension, aligned with batch rows
pub const BATCH_DIM: usize = 0;

/// The `1st` dimension is the sub-token dimension, aligned with tokenizer positions
pub const SEQ_DIM: usize = 1;

/// The `2nd` dimension holds one score per label
pub const LABEL_DIM: usize = 2;
