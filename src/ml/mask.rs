// ============================================================
// Layer 5 — Causal Mask Builder
// ============================================================
// Builds the look-ahead mask that keeps a decoder position from
// attending to positions after it. Entry (i, j) is `true` when
// j > i — true means "disallowed" and is later filled with a
// large negative bias before the attention softmax.
//
// The mask is a pure function of the sequence length: content
// never matters, and every decoder layer applies the identical
// mask. It is rebuilt on every forward pass because generation
// grows the sequence by one token per step.
//
// Burn's tril_mask returns `false` on and below the diagonal
// (allowed) and `true` strictly above it (blocked), which is
// exactly the orientation mask_fill expects.

use burn::prelude::*;

/// Causal mask of shape [seq_len, seq_len]; `true` above the
/// diagonal. Broadcast across batch and heads at the use site.
pub fn causal_mask<B: Backend>(seq_len: usize, device: &B::Device) -> Tensor<B, 2, Bool> {
    Tensor::<B, 2, Bool>::tril_mask([seq_len, seq_len], 0, device)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_disallowed_count_is_strict_upper_triangle() {
        let device = Default::default();
        for len in [1usize, 2, 3, 8] {
            let mask = causal_mask::<TestBackend>(len, &device);
            let blocked: i64 = mask.int().sum().into_scalar().elem::<i64>();
            assert_eq!(
                blocked as usize,
                len * (len - 1) / 2,
                "wrong blocked count for len={len}"
            );
        }
    }

    #[test]
    fn test_each_position_sees_itself_and_the_past() {
        let device = Default::default();
        let len    = 5;
        let mask   = causal_mask::<TestBackend>(len, &device);
        let flags: Vec<bool> = mask.into_data().to_vec().unwrap();

        for i in 0..len {
            for j in 0..len {
                let blocked = flags[i * len + j];
                assert_eq!(blocked, j > i, "mask[{i}][{j}] has wrong orientation");
            }
        }
    }

    #[test]
    fn test_single_position_is_fully_allowed() {
        let device = Default::default();
        let mask   = causal_mask::<TestBackend>(1, &device);
        let blocked: i64 = mask.int().sum().into_scalar().elem::<i64>();
        assert_eq!(blocked, 0);
    }
}
