// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load .txt files            (Layer 4 - data)
//   Step 2: Clean the text             (Layer 4 - data)
//   Step 3: Build / load tokenizer     (Layer 6 - infra)
//   Step 4: Encode corpus into ids     (here)
//   Step 5: Chunk into fixed windows   (Layer 4 - data)
//   Step 6: Split train/validation     (Layer 4 - data)
//   Step 7: Save config                (Layer 6 - infra)
//   Step 8: Run training loop          (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    chunker::SequenceChunker,
    dataset::SequenceDataset,
    loader::TextLoader,
    preprocessor::Preprocessor,
    splitter::split_train_val,
};
use crate::domain::traits::CorpusSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    tokenizer_store::{end_token_id, model_vocab_size, pad_token_id, TokenizerStore},
};
use crate::ml::{
    activation::Activation,
    gpt::Gpt,
    model::GptModelConfig,
    trainer::TrainOptions,
};

/// Training backend: autodiff on top of the WGPU device, like
/// the rest of the Burn ecosystem uses for consumer GPUs.
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Fraction of sequences kept for training; the rest is held
/// out to report validation loss per epoch.
const TRAIN_FRACTION: f64 = 0.9;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialisable so the
// exact architecture can be rebuilt for generation later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub corpus_dir:     String,
    pub checkpoint_dir: String,
    pub seq_len:        usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub embedding_dim:  usize,
    pub heads:          usize,
    pub n_layers:       usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub eps:            f64,
    pub activation:     String,
    pub vocab_size:     usize,
    pub tied_output:    bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_dir:     "data/corpus".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            seq_len:        128,
            batch_size:     16,
            epochs:         10,
            lr:             6e-4,
            embedding_dim:  256,
            heads:          8,
            n_layers:       6,
            d_ff:           1024,
            dropout:        0.1,
            eps:            1e-5,
            activation:     "relu".to_string(),
            vocab_size:     8192,
            tied_output:    false,
        }
    }
}

impl TrainConfig {
    /// The architecture part of this run configuration.
    /// `vocab_size` here is the tokenizer-derived model vocabulary,
    /// not the requested maximum.
    pub fn model_config(&self, vocab_size: usize) -> Result<GptModelConfig> {
        Ok(GptModelConfig::new(vocab_size)
            .with_n_layers(self.n_layers)
            .with_embedding_dim(self.embedding_dim)
            .with_heads(self.heads)
            .with_d_ff(self.d_ff)
            .with_dropout_rate(self.dropout)
            .with_eps(self.eps)
            .with_activation(Activation::parse(&self.activation)?)
            .with_tied_output(self.tied_output))
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Load the corpus ───────────────────────────────────────────
        tracing::info!("Loading .txt files from '{}'", cfg.corpus_dir);
        let loader   = TextLoader::new(&cfg.corpus_dir);
        let raw_docs = loader.load_all()?;
        if raw_docs.is_empty() {
            bail!("No .txt documents found in '{}'", cfg.corpus_dir);
        }

        // ── Step 2: Clean / normalise text ────────────────────────────────────
        let preprocessor = Preprocessor::new();
        let clean_docs: Vec<String> = raw_docs
            .iter()
            .map(|d| preprocessor.clean(&d.text))
            .collect();

        // ── Step 3: Build / load tokenizer ────────────────────────────────────
        // Training and generation must share one vocabulary, so the
        // tokenizer lives in the checkpoint directory.
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        let tokenizer = tok_store.load_or_build(&clean_docs, cfg.vocab_size)?;
        let end_id    = end_token_id(&tokenizer)?;
        let pad_id    = pad_token_id(&tokenizer)?;
        let vocab     = model_vocab_size(&tokenizer);
        tracing::info!("Tokenizer ready: model vocabulary {} ids", vocab);

        // ── Step 4: Encode the corpus into one id stream ──────────────────────
        // Documents are separated by the end-of-sequence token so
        // the model can learn where text stops.
        let mut stream: Vec<u32> = Vec::new();
        for doc in &clean_docs {
            let enc = tokenizer
                .encode(doc.as_str(), false)
                .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
            stream.extend_from_slice(enc.get_ids());
            stream.push(end_id);
        }
        tracing::info!("Corpus encoded: {} tokens", stream.len());

        // ── Step 5: Chunk into fixed-length windows ───────────────────────────
        // Overlap of 1/8 window keeps boundary transitions visible.
        let chunker   = SequenceChunker::new(cfg.seq_len, cfg.seq_len / 8, pad_id);
        let sequences = chunker.chunk(&stream);
        tracing::info!("Created {} training windows", sequences.len());

        // ── Step 6: Train / validation split ──────────────────────────────────
        let (train_seqs, val_seqs) = split_train_val(sequences, TRAIN_FRACTION);
        tracing::info!(
            "Split: {} train, {} validation",
            train_seqs.len(),
            val_seqs.len()
        );
        let train_dataset = SequenceDataset::new(train_seqs);
        let val_dataset   = if val_seqs.is_empty() {
            None
        } else {
            Some(SequenceDataset::new(val_seqs))
        };

        // ── Step 7: Save config for generation ────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);

        let mut gpt = Gpt::<TrainBackend>::new(self.config.model_config(vocab)?, device)?;
        tracing::info!(
            "Model ready: {} layers, embedding_dim={}, {} parameters",
            cfg.n_layers,
            cfg.embedding_dim,
            gpt.num_params()
        );

        let opts = TrainOptions::new(cfg.batch_size, cfg.epochs, cfg.lr);
        gpt.fit_with(
            train_dataset,
            val_dataset,
            &opts,
            Some(&ckpt_manager),
            Some(&metrics),
        )?;

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_carries_hyperparameters() {
        let mut cfg = TrainConfig::default();
        cfg.activation = "gelu".to_string();
        cfg.heads      = 4;

        let model_cfg = cfg.model_config(1000).unwrap();
        assert_eq!(model_cfg.vocab_size, 1000);
        assert_eq!(model_cfg.heads, 4);
        assert_eq!(model_cfg.activation, Activation::Gelu);
        assert!(model_cfg.validate().is_ok());
    }

    #[test]
    fn test_model_config_rejects_bad_activation() {
        let mut cfg = TrainConfig::default();
        cfg.activation = "swishish".to_string();
        assert!(cfg.model_config(1000).is_err());
    }
}
