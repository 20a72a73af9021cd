// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved per training run:
//   1. Model weights (.mpk.gz, one file per epoch)
//   2. latest_epoch.json — which epoch was last saved
//   3. train_config.json — the architecture + run configuration
//
// The config is saved separately because a checkpoint can only
// be loaded into an identically shaped model: vocabulary size,
// layer count, embedding dimension, head count and feed-forward
// width all have to match. Loading into a mismatched model is a
// fatal error, never a partial merge — CompactRecorder's typed
// records enforce that.
//
// Writes are synchronous whole-file operations; a crash mid-write
// corrupts that file and is not mitigated here.
//
// File layout:
//   checkpoints/
//     model_epoch_1.mpk.gz
//     model_epoch_2.mpk.gz
//     ...
//     latest_epoch.json
//     train_config.json
//     tokenizer.json        ← written by TokenizerStore
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::GptModel;

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory
    /// if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save model weights for a given epoch and move the
    /// latest-epoch pointer forward.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &GptModel<B>,
        epoch: usize,
    ) -> Result<()> {
        // Recorder adds the .mpk.gz extension itself
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load weights from the latest saved checkpoint into `model`.
    /// The model must have the architecture the checkpoint was
    /// saved with, or loading fails.
    pub fn load_model<B: Backend>(
        &self,
        model:  GptModel<B>,
        device: &B::Device,
    ) -> Result<GptModel<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Save the run configuration so generation can rebuild the
    /// exact model architecture later. Must happen before epoch 1.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the run configuration written by a previous `train`.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'generate'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Read latest_epoch.json and return the epoch number.
    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest_epoch.json'. Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::GptModelConfig;

    type TestAutodiffBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn tiny_model_config() -> GptModelConfig {
        GptModelConfig::new(10)
            .with_n_layers(1)
            .with_embedding_dim(8)
            .with_heads(2)
            .with_d_ff(16)
    }

    #[test]
    fn test_save_and_reload_latest_epoch() {
        let dir     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().to_str().unwrap());
        let device  = Default::default();

        let model = tiny_model_config().init::<TestAutodiffBackend>(&device);
        manager.save_model(&model, 3).unwrap();

        // A same-architecture model picks up the epoch-3 weights
        let fresh    = tiny_model_config().init::<TestAutodiffBackend>(&device);
        let restored = manager.load_model(fresh, &device);
        assert!(restored.is_ok());
    }

    #[test]
    fn test_load_without_training_fails() {
        let dir     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().to_str().unwrap());
        let device  = Default::default();

        let model = tiny_model_config().init::<TestAutodiffBackend>(&device);
        assert!(manager.load_model(model, &device).is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let dir     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path().to_str().unwrap());

        let cfg = TrainConfig::default();
        manager.save_config(&cfg).unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.embedding_dim, cfg.embedding_dim);
        assert_eq!(loaded.heads, cfg.heads);
        assert_eq!(loaded.activation, cfg.activation);
    }
}
