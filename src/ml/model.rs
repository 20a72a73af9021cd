// ============================================================
// Layer 5 — Decoder Stack / GPT Model
// ============================================================
// The computational architecture:
//
//   token ids ─► Embedding ─► DecoderLayer × n ─► logit projection
//
// Each DecoderLayer applies masked self-attention and then the
// position-wise feed-forward network, each wrapped in its own
// ResidualNorm instance. The same causal mask is applied at
// every layer.
//
// The logit projection is configurable: a dedicated Linear head
// by default, or — with `tied_output` — the transpose of the
// embedding table, so input and output vocabularies share one
// weight matrix.
//
// Reference: Radford et al. (2018) GPT
//            Press & Wolf (2017) — tied embeddings

use anyhow::{bail, Result};
use burn::{
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig},
    prelude::*,
};

use crate::ml::activation::Activation;
use crate::ml::attention::{MultiHeadSelfAttention, MultiHeadSelfAttentionConfig};
use crate::ml::feedforward::{PositionWiseFeedForward, PositionWiseFeedForwardConfig};
use crate::ml::sublayer::{ResidualNorm, ResidualNormConfig};

// ─── Model Configuration ──────────────────────────────────────────────────────
// The full architecture surface, fixed for the model lifetime.
// Serialised to train_config-adjacent JSON so a checkpoint can
// be reloaded into an identically shaped model later.
//
// NOTE: #[derive(Config)] already generates Clone and
// Serialize/Deserialize internally — do NOT add them again.
#[derive(Config, Debug)]
pub struct GptModelConfig {
    pub vocab_size:    usize,
    #[config(default = 6)]
    pub n_layers:      usize,
    #[config(default = 256)]
    pub embedding_dim: usize,
    #[config(default = 8)]
    pub heads:         usize,
    #[config(default = 1024)]
    pub d_ff:          usize,
    #[config(default = 0.1)]
    pub dropout_rate:  f64,
    #[config(default = 1e-5)]
    pub eps:           f64,
    #[config(default = "Activation::Relu")]
    pub activation:    Activation,
    #[config(default = false)]
    pub tied_output:   bool,
}

impl GptModelConfig {
    /// Reject impossible architectures before any tensor is
    /// allocated. Called by the facade at construction.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 {
            bail!("vocab_size must be at least 1");
        }
        if self.heads == 0 {
            bail!("heads must be at least 1");
        }
        if self.embedding_dim % self.heads != 0 {
            bail!(
                "embedding_dim ({}) must be divisible by heads ({})",
                self.embedding_dim,
                self.heads
            );
        }
        if self.n_layers == 0 {
            bail!("n_layers must be at least 1");
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> GptModel<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device);
        let layers: Vec<DecoderLayer<B>> = (0..self.n_layers)
            .map(|_| self.build_decoder_layer(device))
            .collect();
        // None = reuse the embedding transpose at the output
        let output = if self.tied_output {
            None
        } else {
            Some(LinearConfig::new(self.embedding_dim, self.vocab_size).init(device))
        };
        GptModel { embedding, layers, output }
    }

    fn build_decoder_layer<B: Backend>(&self, device: &B::Device) -> DecoderLayer<B> {
        let attention = MultiHeadSelfAttentionConfig::new(self.embedding_dim, self.heads)
            .init(device);
        let feed_forward = PositionWiseFeedForwardConfig::new(self.embedding_dim, self.d_ff)
            .with_activation(self.activation)
            .init(device);
        let wrap = ResidualNormConfig::new(self.embedding_dim)
            .with_dropout_rate(self.dropout_rate)
            .with_eps(self.eps);
        DecoderLayer {
            attention,
            feed_forward,
            attention_norm:    wrap.init(device),
            feed_forward_norm: wrap.init(device),
        }
    }
}

// ─── Decoder Layer ────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct DecoderLayer<B: Backend> {
    attention:         MultiHeadSelfAttention<B>,
    feed_forward:      PositionWiseFeedForward<B>,
    attention_norm:    ResidualNorm<B>,
    feed_forward_norm: ResidualNorm<B>,
}

impl<B: Backend> DecoderLayer<B> {
    /// x: [batch, len, dim] → same shape out. Operates
    /// position-wise/pairwise, so any length is accepted.
    pub fn forward(&self, x: Tensor<B, 3>, mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        // sublayer 1: masked self-attention
        let attended = self.attention.forward(x.clone(), mask);
        let x = self.attention_norm.forward(attended, x);

        // sublayer 2: position-wise feed-forward
        let transformed = self.feed_forward.forward(x.clone());
        self.feed_forward_norm.forward(transformed, x)
    }
}

// ─── GPT Model ────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct GptModel<B: Backend> {
    embedding: Embedding<B>,
    layers:    Vec<DecoderLayer<B>>,
    /// None when the output projection is tied to the embedding
    output:    Option<Linear<B>>,
}

impl<B: Backend> GptModel<B> {
    /// tokens: [batch, len] → logits: [batch, len, vocab_size].
    /// Pure function of parameters and inputs; dropout is decided
    /// by the backend (autodiff = training), not by an argument.
    pub fn forward(&self, tokens: Tensor<B, 2, Int>, mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let mut x = self.embedding.forward(tokens);
        for layer in &self.layers {
            x = layer.forward(x, mask.clone());
        }

        match &self.output {
            Some(head) => head.forward(x),
            None => {
                // Tied projection: logits = hidden · Eᵀ
                let [batch, _len, _dim] = x.dims();
                let weight = self.embedding.weight.val().transpose(); // [dim, vocab]
                let [dim, vocab] = weight.dims();
                x.matmul(weight.unsqueeze::<3>().expand([batch, dim, vocab]))
            }
        }
    }
}
