// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `generate`, and all
// their configurable flags. clap's derive macros generate the
// help text, missing-argument errors and type conversions.

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the GPT language model on a directory of .txt files
    Train(TrainArgs),

    /// Continue a text prompt using a trained checkpoint
    Generate(GenerateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing .txt files to train on
    #[arg(long, default_value = "data/corpus")]
    pub corpus_dir: String,

    /// Directory to save model checkpoints and the tokenizer
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of token positions per training window
    #[arg(long, default_value_t = 128)]
    pub seq_len: usize,

    /// Number of windows processed together in one forward pass
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 6e-4)]
    pub lr: f64,

    /// Width of the token embedding vectors
    /// (must be divisible by --heads)
    #[arg(long, default_value_t = 256)]
    pub embedding_dim: usize,

    /// Number of attention heads per decoder layer
    #[arg(long, default_value_t = 8)]
    pub heads: usize,

    /// Number of stacked decoder layers
    #[arg(long, default_value_t = 6)]
    pub n_layers: usize,

    /// Inner dimension of the feed-forward network
    /// (typically 4x the embedding width)
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    /// Dropout probability inside the residual wrappers
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Layer-norm epsilon
    #[arg(long, default_value_t = 1e-5)]
    pub eps: f64,

    /// Feed-forward nonlinearity: relu, gelu, silu or leaky_relu
    #[arg(long, default_value = "relu")]
    pub activation: String,

    /// Maximum tokenizer vocabulary size (special tokens included)
    #[arg(long, default_value_t = 8192)]
    pub vocab_size: usize,

    /// Tie the output projection to the embedding table transpose
    /// instead of learning a separate head
    #[arg(long)]
    pub tied_output: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 — the
/// application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus_dir:     a.corpus_dir,
            checkpoint_dir: a.checkpoint_dir,
            seq_len:        a.seq_len,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            embedding_dim:  a.embedding_dim,
            heads:          a.heads,
            n_layers:       a.n_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            eps:            a.eps,
            activation:     a.activation,
            vocab_size:     a.vocab_size,
            tied_output:    a.tied_output,
        }
    }
}

/// All arguments for the `generate` command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// The text prompt to continue
    #[arg(long)]
    pub prompt: String,

    /// Total length bound, prompt tokens included; generation
    /// also stops early when the end-of-sequence token appears
    #[arg(long, default_value_t = 100)]
    pub max_length: usize,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
