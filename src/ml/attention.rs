// ============================================================
// Layer 5 — Masked Multi-Head Self-Attention
// ============================================================
// Hand-built scaled dot-product attention over several heads:
//
//   1. Project the input three times (query / key / value)
//   2. Split each projection into `heads` subspaces of
//      head_dim = embedding_dim / heads
//   3. Per head: softmax((Q·Kᵀ)/√head_dim + mask bias)·V
//   4. Merge the heads back and apply the output projection
//
// The causal mask arrives as a [len, len] Bool tensor; blocked
// entries are filled with a large negative bias so the softmax
// assigns them zero weight. Each weight row therefore sums to 1
// over the allowed positions only.
//
// embedding_dim must be divisible by heads — the model config
// validates this before init, and init asserts it again as a
// precondition.
//
// Reference: Vaswani et al. (2017) §3.2

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation,
};

/// Bias used to blank out masked attention scores. Large enough
/// that the softmax underflows the weight to exactly zero, while
/// avoiding the NaN that a literal -inf can produce.
const MASK_BIAS: f64 = -1.0e9;

#[derive(Config, Debug)]
pub struct MultiHeadSelfAttentionConfig {
    pub embedding_dim: usize,
    pub heads:         usize,
}

impl MultiHeadSelfAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MultiHeadSelfAttention<B> {
        assert_eq!(
            self.embedding_dim % self.heads,
            0,
            "embedding_dim ({}) must be divisible by heads ({})",
            self.embedding_dim,
            self.heads
        );
        let d = self.embedding_dim;
        MultiHeadSelfAttention {
            query:    LinearConfig::new(d, d).init(device),
            key:      LinearConfig::new(d, d).init(device),
            value:    LinearConfig::new(d, d).init(device),
            output:   LinearConfig::new(d, d).init(device),
            heads:    self.heads,
            head_dim: d / self.heads,
        }
    }
}

#[derive(Module, Debug)]
pub struct MultiHeadSelfAttention<B: Backend> {
    query:    Linear<B>,
    key:      Linear<B>,
    value:    Linear<B>,
    output:   Linear<B>,
    heads:    usize,
    head_dim: usize,
}

impl<B: Backend> MultiHeadSelfAttention<B> {
    /// Self-attention: x is query, key and value at once.
    /// x: [batch, len, embedding_dim] → same shape out.
    pub fn forward(&self, x: Tensor<B, 3>, mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let [batch, len, dim] = x.dims();

        let q = self.split_heads(self.query.forward(x.clone()), batch, len);
        let k = self.split_heads(self.key.forward(x.clone()), batch, len);
        let v = self.split_heads(self.value.forward(x), batch, len);

        // [batch, heads, len, len] — rows sum to 1 over allowed columns
        let weights = self.attention_weights(q, k, mask);

        // Weighted sum of values, then merge heads: [batch, len, dim]
        let context = weights.matmul(v);
        let merged  = context.swap_dims(1, 2).reshape([batch, len, dim]);

        self.output.forward(merged)
    }

    /// [batch, len, dim] → [batch, heads, len, head_dim]
    fn split_heads(&self, x: Tensor<B, 3>, batch: usize, len: usize) -> Tensor<B, 4> {
        x.reshape([batch, len, self.heads, self.head_dim])
            .swap_dims(1, 2)
    }

    /// softmax((Q·Kᵀ)/√head_dim + mask bias) over the key axis.
    /// Exposed to the crate so tests can check the row-sum and
    /// masked-mass invariants directly.
    pub(crate) fn attention_weights(
        &self,
        q:    Tensor<B, 4>,
        k:    Tensor<B, 4>,
        mask: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 4> {
        let [batch, heads, len, _] = q.dims();

        let scale  = (self.head_dim as f64).sqrt();
        let scores = q.matmul(k.swap_dims(2, 3)) / scale;

        // Broadcast the [len, len] mask across batch and heads
        let mask = mask
            .unsqueeze_dims::<4>(&[0, 1])
            .expand([batch, heads, len, len]);
        let scores = scores.mask_fill(mask, MASK_BIAS);

        activation::softmax(scores, 3)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::mask::causal_mask;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_output_shape_equals_input_shape() {
        let device = Default::default();
        let attn   = MultiHeadSelfAttentionConfig::new(16, 4).init::<TestBackend>(&device);

        let x    = Tensor::<TestBackend, 3>::random([2, 5, 16], Distribution::Default, &device);
        let mask = causal_mask::<TestBackend>(5, &device);

        assert_eq!(attn.forward(x, mask).dims(), [2, 5, 16]);
    }

    #[test]
    fn test_weight_rows_sum_to_one_over_allowed_positions() {
        let device = Default::default();
        let attn   = MultiHeadSelfAttentionConfig::new(8, 2).init::<TestBackend>(&device);

        let len = 4;
        let q = Tensor::<TestBackend, 4>::random([1, 2, len, 4], Distribution::Default, &device);
        let k = Tensor::<TestBackend, 4>::random([1, 2, len, 4], Distribution::Default, &device);
        let mask    = causal_mask::<TestBackend>(len, &device);
        let weights = attn.attention_weights(q, k, mask.clone());

        // Every row sums to 1
        let row_sums: Vec<f32> = weights
            .clone()
            .sum_dim(3)
            .into_data()
            .to_vec()
            .unwrap();
        for (i, sum) in row_sums.iter().enumerate() {
            assert!((sum - 1.0).abs() < 1e-5, "row {i} sums to {sum}");
        }

        // Masked positions carry exactly zero mass
        let blocked = mask
            .unsqueeze_dims::<4>(&[0, 1])
            .expand([1, 2, len, len])
            .float();
        let masked_mass: f32 = (weights * blocked).sum().into_scalar().elem::<f32>();
        assert_eq!(masked_mass, 0.0);
    }

    #[test]
    #[should_panic]
    fn test_indivisible_heads_is_a_precondition_violation() {
        let device = Default::default();
        let _ = MultiHeadSelfAttentionConfig::new(10, 3).init::<TestBackend>(&device);
    }
}
