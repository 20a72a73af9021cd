// ============================================================
// Layer 5 — Gpt Facade
// ============================================================
// The single owner of the parameter bundle. Wraps GptModel with
// everything callers need:
//
//   forward  — logits for a token batch
//   save     — whole-bundle snapshot to one file (overwrites)
//   load     — restore from a file; missing file is a no-op,
//              structural mismatch is a fatal error
//   fit      — the training loop (sequences, batch_size,
//              epochs, learning_rate)
//   predict  — greedy autoregressive generation
//
// The facade is generic over an autodiff backend; the device is
// an explicit value given at construction and threaded to every
// tensor — there is no process-wide "current device". Training
// runs on B itself, inference runs on B::InnerBackend through
// model.valid(), which is what turns dropout off.
//
// If a checkpoint path is configured it is restored before
// training and before every generation call; parameters are
// otherwise mutated only by the optimiser. Concurrent use of one
// Gpt during fit is not synchronised — callers serialise.

use anyhow::{ensure, Context, Result};
use burn::{
    module::{AutodiffModule, Module},
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use std::path::{Path, PathBuf};

use crate::data::dataset::SequenceDataset;
use crate::domain::sequence::TokenSequence;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::MetricsLogger;
use crate::ml::mask::causal_mask;
use crate::ml::model::{GptModel, GptModelConfig};
use crate::ml::trainer::{run_training, TrainOptions};

pub struct Gpt<B: AutodiffBackend> {
    model:      GptModel<B>,
    config:     GptModelConfig,
    device:     B::Device,
    checkpoint: Option<PathBuf>,
}

impl<B: AutodiffBackend> Gpt<B> {
    /// Build a freshly initialised model. Fails fast on an
    /// impossible architecture (e.g. embedding_dim not divisible
    /// by heads) — a configuration error is fatal, never deferred.
    pub fn new(config: GptModelConfig, device: B::Device) -> Result<Self> {
        config.validate()?;
        let model = config.init(&device);
        Ok(Self { model, config, device, checkpoint: None })
    }

    /// Configure a checkpoint path restored before training and
    /// inference. The file not existing yet is fine.
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    pub fn config(&self) -> &GptModelConfig {
        &self.config
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Total learned parameter count across the bundle.
    pub fn num_params(&self) -> usize {
        self.model.num_params()
    }

    // ─── Forward ──────────────────────────────────────────────────────────────

    /// tokens: [batch, len] → logits: [batch, len, vocab_size].
    pub fn forward(&self, tokens: Tensor<B, 2, Int>, mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        self.model.forward(tokens, mask)
    }

    /// Inference-mode logits for a single id slice — dropout off,
    /// mask derived from the slice length.
    pub fn logits(&self, ids: &[u32]) -> Result<Tensor<B::InnerBackend, 3>> {
        ensure!(!ids.is_empty(), "token sequence must not be empty");
        let model = self.model.valid();
        Ok(self.logits_with(&model, ids))
    }

    fn logits_with(
        &self,
        model: &GptModel<B::InnerBackend>,
        ids:   &[u32],
    ) -> Tensor<B::InnerBackend, 3> {
        let len = ids.len();
        let flat: Vec<i32> = ids.iter().map(|&id| id as i32).collect();
        let tokens = Tensor::<B::InnerBackend, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([1, len]);
        let mask = causal_mask::<B::InnerBackend>(len, &self.device);
        model.forward(tokens, mask)
    }

    // ─── Checkpoint I/O ───────────────────────────────────────────────────────

    /// Serialise the full parameter bundle to `path`, overwriting
    /// any existing file. The recorder appends its own extension.
    pub fn save(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        CompactRecorder::new()
            .record(self.model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        tracing::info!("Model saved to '{}'", path.display());
        Ok(())
    }

    /// Replace the in-memory bundle with the one at `path`. An
    /// absent file is a no-op; a bundle whose names or shapes do
    /// not match the live architecture is a fatal error.
    pub fn load(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        if !checkpoint_exists(&path) {
            tracing::debug!("No checkpoint at '{}' — keeping current parameters", path.display());
            return Ok(());
        }

        let record = CompactRecorder::new()
            .load(path.clone(), &self.device)
            .with_context(|| {
                format!("Checkpoint '{}' does not match this architecture", path.display())
            })?;
        self.model = self.model.clone().load_record(record);
        tracing::info!("Model restored from '{}'", path.display());
        Ok(())
    }

    /// Restore parameters from a checkpoint directory managed by
    /// a CheckpointManager (latest epoch snapshot).
    pub fn restore_from(&mut self, manager: &CheckpointManager) -> Result<()> {
        self.model = manager.load_model(self.model.clone(), &self.device)?;
        Ok(())
    }

    fn restore_configured_checkpoint(&mut self) -> Result<()> {
        if let Some(path) = self.checkpoint.clone() {
            self.load(path)?;
        }
        Ok(())
    }

    // ─── Training ─────────────────────────────────────────────────────────────

    /// The minimal training surface: shuffled batches, teacher-
    /// forced cross-entropy, one Adam step per batch.
    pub fn fit(
        &mut self,
        sequences:     Vec<TokenSequence>,
        batch_size:    usize,
        epochs:        usize,
        learning_rate: f64,
    ) -> Result<()> {
        let opts = TrainOptions::new(batch_size, epochs, learning_rate);
        self.fit_with(SequenceDataset::new(sequences), None, &opts, None, None)
    }

    /// Full training surface used by the train use case: optional
    /// held-out validation set, per-epoch checkpoints and metrics.
    pub fn fit_with(
        &mut self,
        train:       SequenceDataset,
        val:         Option<SequenceDataset>,
        opts:        &TrainOptions,
        checkpoints: Option<&CheckpointManager>,
        metrics:     Option<&MetricsLogger>,
    ) -> Result<()> {
        ensure!(train.sequence_count() > 0, "cannot train on an empty dataset");
        ensure!(opts.batch_size > 0, "batch_size must be at least 1");

        // A configured checkpoint is restored once, before epoch 1
        self.restore_configured_checkpoint()?;

        let trained = run_training(
            self.model.clone(),
            &self.device,
            train,
            val,
            opts,
            checkpoints,
            metrics,
        )?;
        self.model = trained;
        Ok(())
    }

    // ─── Generation ───────────────────────────────────────────────────────────

    /// Greedy autoregressive decoding. Starting from `inputs`,
    /// repeatedly append the argmax token of the final position
    /// until the sequence holds `max_length` tokens, stopping
    /// early once `end_token` has been produced (the end token
    /// itself is kept). Returns the full sequence, seed included.
    pub fn predict(&mut self, inputs: &[u32], max_length: usize, end_token: u32) -> Result<Vec<u32>> {
        ensure!(!inputs.is_empty(), "seed sequence must not be empty");

        self.restore_configured_checkpoint()?;
        let model = self.model.valid();

        let mut ids: Vec<u32> = inputs.to_vec();

        while ids.len() < max_length {
            // Mask and logits are rebuilt for the grown sequence
            let logits = self.logits_with(&model, &ids);
            let [_, len, vocab] = logits.dims();

            // Final-position logits only, then the argmax index
            let last = logits
                .slice([0..1, (len - 1)..len, 0..vocab])
                .reshape([1, vocab]);
            let next = last.argmax(1).into_scalar().elem::<i64>() as u32;

            ids.push(next);
            if next == end_token {
                break;
            }
        }

        Ok(ids)
    }
}

/// The recorder writes `<path>.mpk.gz`; accept either spelling
/// when probing for existence.
fn checkpoint_exists(path: &Path) -> bool {
    path.exists() || path.with_extension("mpk.gz").exists()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestAutodiffBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn tiny_gpt() -> Gpt<TestAutodiffBackend> {
        let config = GptModelConfig::new(10)
            .with_n_layers(1)
            .with_embedding_dim(8)
            .with_heads(2)
            .with_d_ff(16);
        Gpt::new(config, Default::default()).unwrap()
    }

    #[test]
    fn test_construction_rejects_indivisible_heads() {
        let config = GptModelConfig::new(10)
            .with_embedding_dim(10)
            .with_heads(3);
        assert!(Gpt::<TestAutodiffBackend>::new(config, Default::default()).is_err());
    }

    #[test]
    fn test_save_then_load_reproduces_outputs() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("model");

        let gpt = tiny_gpt();
        gpt.save(&path).unwrap();

        let before = gpt.logits(&[1, 2, 3]).unwrap();

        // A freshly constructed model starts from different random
        // weights; loading must overwrite them wholesale.
        let mut restored = tiny_gpt();
        restored.load(&path).unwrap();
        let after = restored.logits(&[1, 2, 3]).unwrap();

        before.into_data().assert_approx_eq(&after.into_data(), 5);
    }

    #[test]
    fn test_loading_missing_checkpoint_is_a_noop() {
        let mut gpt = tiny_gpt();

        let before = gpt.logits(&[4, 5, 6]).unwrap();
        gpt.load("no/such/checkpoint/anywhere").unwrap();
        let after = gpt.logits(&[4, 5, 6]).unwrap();

        before.into_data().assert_approx_eq(&after.into_data(), 7);
    }

    #[test]
    fn test_predict_stops_right_after_the_end_token() {
        let mut gpt = tiny_gpt();

        // Whatever the untrained model predicts first, declaring
        // that id to be the end token must stop generation with
        // exactly one appended token.
        let seed = [5u32, 9];
        let first = {
            let logits = gpt.logits(&seed).unwrap();
            let [_, len, vocab] = logits.dims();
            let last = logits.slice([0..1, (len - 1)..len, 0..vocab]).reshape([1, vocab]);
            last.argmax(1).into_scalar().elem::<i64>() as u32
        };

        let out = gpt.predict(&seed, 5, first).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(&out[..2], &seed);
        assert_eq!(out[2], first);
    }

    #[test]
    fn test_predict_is_bounded_by_max_length() {
        let mut gpt = tiny_gpt();

        // An end token outside the vocabulary can never be
        // produced, so the loop must run to the length bound.
        let out = gpt.predict(&[5, 9], 5, u32::MAX).unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(&out[..2], &[5, 9]);
    }

    #[test]
    fn test_predict_returns_seed_when_already_at_max_length() {
        let mut gpt = tiny_gpt();
        let out = gpt.predict(&[1, 2, 3], 3, 0).unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_configured_checkpoint_is_restored_before_inference() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("model");

        let mut saved = tiny_gpt();
        saved.save(&path).unwrap();

        // A different random model configured with that checkpoint
        // must generate exactly what the saved model generates.
        let mut restored = tiny_gpt().with_checkpoint(&path);

        let a = saved.predict(&[1, 2], 6, u32::MAX).unwrap();
        let b = restored.predict(&[1, 2], 6, u32::MAX).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fit_then_predict_roundtrip() {
        let mut gpt = tiny_gpt();
        let sequences = vec![
            TokenSequence::new(vec![1, 2, 3, 4]),
            TokenSequence::new(vec![2, 3, 4, 5]),
        ];
        gpt.fit(sequences, 2, 1, 1e-3).unwrap();

        let out = gpt.predict(&[1, 2], 4, u32::MAX).unwrap();
        assert_eq!(out.len(), 4);
    }
}
