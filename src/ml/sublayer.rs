// ============================================================
// Layer 5 — Residual + Normalise Sublayer
// ============================================================
// The generic wrapper around both sublayers of a decoder layer:
//
//   norm(input + dropout(sublayer_output))
//
// Dropout fires only on an autodiff backend (training); on the
// inference backend obtained via `.valid()` it is inert, so the
// forward pass is deterministic at generation time. The
// normalisation is a standard LayerNorm over the embedding
// dimension with learned scale and shift.
//
// One component type, instantiated twice per decoder layer —
// once after attention, once after the feed-forward network.

use burn::{
    nn::{Dropout, DropoutConfig, LayerNorm, LayerNormConfig},
    prelude::*,
};

#[derive(Config, Debug)]
pub struct ResidualNormConfig {
    pub embedding_dim: usize,
    #[config(default = 0.1)]
    pub dropout_rate:  f64,
    #[config(default = 1e-5)]
    pub eps:           f64,
}

impl ResidualNormConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ResidualNorm<B> {
        ResidualNorm {
            dropout: DropoutConfig::new(self.dropout_rate).init(),
            norm:    LayerNormConfig::new(self.embedding_dim)
                .with_epsilon(self.eps)
                .init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct ResidualNorm<B: Backend> {
    dropout: Dropout,
    norm:    LayerNorm<B>,
}

impl<B: Backend> ResidualNorm<B> {
    /// `sublayer_output` is what the wrapped sublayer produced,
    /// `input` is what went into it. Both [batch, len, dim].
    pub fn forward(&self, sublayer_output: Tensor<B, 3>, input: Tensor<B, 3>) -> Tensor<B, 3> {
        self.norm.forward(input + self.dropout.forward(sublayer_output))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_shape_is_preserved() {
        let device = Default::default();
        let wrap   = ResidualNormConfig::new(8).init::<TestBackend>(&device);

        let out   = Tensor::<TestBackend, 3>::random([2, 3, 8], Distribution::Default, &device);
        let input = Tensor::<TestBackend, 3>::random([2, 3, 8], Distribution::Default, &device);
        assert_eq!(wrap.forward(out, input).dims(), [2, 3, 8]);
    }

    #[test]
    fn test_deterministic_without_autodiff() {
        // On a plain backend dropout is inert, so repeated calls
        // must agree bit for bit.
        let device = Default::default();
        let wrap   = ResidualNormConfig::new(8)
            .with_dropout_rate(0.5)
            .init::<TestBackend>(&device);

        let out   = Tensor::<TestBackend, 3>::random([1, 4, 8], Distribution::Default, &device);
        let input = Tensor::<TestBackend, 3>::random([1, 4, 8], Distribution::Default, &device);

        let a = wrap.forward(out.clone(), input.clone());
        let b = wrap.forward(out, input);
        a.into_data().assert_approx_eq(&b.into_data(), 7);
    }

    #[test]
    fn test_normalised_rows_have_zero_mean() {
        let device = Default::default();
        let wrap   = ResidualNormConfig::new(6).init::<TestBackend>(&device);

        let out   = Tensor::<TestBackend, 3>::random([1, 2, 6], Distribution::Default, &device);
        let input = Tensor::<TestBackend, 3>::random([1, 2, 6], Distribution::Default, &device);

        // Fresh LayerNorm has scale 1 / shift 0, so every position's
        // output should be standardised over the embedding dimension.
        let y = wrap.forward(out, input);
        let means: Vec<f32> = y.mean_dim(2).into_data().to_vec().unwrap();
        for m in means {
            assert!(m.abs() < 1e-4, "position mean {m} not ~0");
        }
    }
}
