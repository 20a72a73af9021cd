// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one
// (plus the data layer's Dataset/Batcher impls).
//
// What's in this layer:
//
//   mask.rs        — causal (look-ahead) mask builder
//   activation.rs  — selectable feed-forward nonlinearity
//   attention.rs   — masked multi-head self-attention
//   feedforward.rs — position-wise feed-forward network
//   sublayer.rs    — residual + dropout + layer-norm wrapper
//   model.rs       — decoder layer, decoder stack, GptModel
//   trainer.rs     — epoch/batch loop: forward, loss, Adam step
//   gpt.rs         — the Gpt facade: forward / save / load /
//                    fit / predict
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need
//            Radford et al. (2018) GPT

/// Causal mask construction
pub mod mask;

/// Feed-forward activation strategy
pub mod activation;

/// Masked multi-head self-attention
pub mod attention;

/// Position-wise feed-forward network
pub mod feedforward;

/// Residual + dropout + normalisation wrapper
pub mod sublayer;

/// Decoder layers, decoder stack, model configuration
pub mod model;

/// Training loop with Adam and per-epoch checkpointing
pub mod trainer;

/// High-level model facade (train / save / load / generate)
pub mod gpt;
