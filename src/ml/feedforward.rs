// ============================================================
// Layer 5 — Position-wise Feed-Forward Network
// ============================================================
// Two linear transforms with a nonlinearity in between,
// applied identically and independently at every sequence
// position:
//
//   linear(embedding_dim → d_ff) → activation → linear(d_ff → embedding_dim)
//
// The activation is the injected strategy from activation.rs;
// it carries no parameters, so it sits in the module behind
// `Ignored` and survives checkpointing untouched.
//
// Reference: Vaswani et al. (2017) §3.3

use burn::{
    module::Ignored,
    nn::{Linear, LinearConfig},
    prelude::*,
};

use crate::ml::activation::Activation;

#[derive(Config, Debug)]
pub struct PositionWiseFeedForwardConfig {
    pub embedding_dim: usize,
    pub d_ff:          usize,
    #[config(default = "Activation::Relu")]
    pub activation:    Activation,
}

impl PositionWiseFeedForwardConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PositionWiseFeedForward<B> {
        PositionWiseFeedForward {
            inner:      LinearConfig::new(self.embedding_dim, self.d_ff).init(device),
            outer:      LinearConfig::new(self.d_ff, self.embedding_dim).init(device),
            activation: Ignored(self.activation),
        }
    }
}

#[derive(Module, Debug)]
pub struct PositionWiseFeedForward<B: Backend> {
    inner:      Linear<B>,
    outer:      Linear<B>,
    activation: Ignored<Activation>,
}

impl<B: Backend> PositionWiseFeedForward<B> {
    /// x: [batch, len, embedding_dim] → same shape out.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let hidden = self.activation.apply(self.inner.forward(x));
        self.outer.forward(hidden)
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
        let ffn    = PositionWiseFeedForwardConfig::new(12, 48).init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 3>::random([3, 7, 12], Distribution::Default, &device);
        assert_eq!(ffn.forward(x).dims(), [3, 7, 12]);
    }

    #[test]
    fn test_positions_are_transformed_independently() {
        let device = Default::default();
        let ffn = PositionWiseFeedForwardConfig::new(4, 16)
            .with_activation(Activation::Gelu)
            .init::<TestBackend>(&device);

        // Two identical positions must map to identical outputs
        let x = Tensor::<TestBackend, 3>::from_floats(
            [[[0.5, -1.0, 2.0, 0.1], [0.5, -1.0, 2.0, 0.1]]],
            &device,
        );
        let y: Vec<f32> = ffn.forward(x).into_data().to_vec().unwrap();
        let (first, second) = y.split_at(4);
        assert_eq!(first, second);
    }
}
