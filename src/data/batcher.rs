// ============================================================
// Layer 4 — Sequence Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<TokenSequence>
// into a single [batch, len] Int tensor on the target device.
//
// The flattening is row-major:
//   [s1_t1 .. s1_tL, s2_t1 .. sN_tL]  →  reshape to [N, L]
//
// All sequences are already padded to one length by the chunker,
// so no dynamic padding happens here.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::sequence::TokenSequence;

// ─── SequenceBatch ────────────────────────────────────────────────────────────
/// A batch of token sequences ready for the model forward pass.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) — generic so the
/// same batcher works on any device.
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// Token id sequences — shape: [batch_size, seq_len].
    /// Each row is one training example; in the teacher-forced
    /// loss the same tensor also serves as the target.
    pub tokens: Tensor<B, 2, Int>,
}

// ─── SequenceBatcher ──────────────────────────────────────────────────────────
/// Holds the target device so tensors are created where the
/// model lives.
#[derive(Clone, Debug)]
pub struct SequenceBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SequenceBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TokenSequence, SequenceBatch<B>> for SequenceBatcher<B> {
    fn batch(&self, items: Vec<TokenSequence>) -> SequenceBatch<B> {
        let batch_size = items.len();
        // All sequences share one length (pre-padded by the chunker)
        let seq_len    = items[0].ids.len();

        // Burn uses i32 for Int tensors, so widen-and-flatten in one pass
        let flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.ids.iter().map(|&id| id as i32))
            .collect();

        let tokens = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        SequenceBatch { tokens }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_batch_shape_and_order() {
        let device  = Default::default();
        let batcher = SequenceBatcher::<TestBackend>::new(device);

        let batch = batcher.batch(vec![
            TokenSequence::new(vec![1, 2, 3]),
            TokenSequence::new(vec![4, 5, 6]),
        ]);

        assert_eq!(batch.tokens.dims(), [2, 3]);

        let values: Vec<i32> = batch.tokens.into_data().to_vec().unwrap();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
    }
}
