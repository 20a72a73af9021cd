// ============================================================
// Layer 2 — Generate Use Case
// ============================================================
// Loads everything a generation session needs — tokenizer,
// architecture config, latest checkpoint — then turns a text
// prompt into ids, runs the facade's greedy loop, and decodes
// the produced ids back into text.
//
// The model architecture is rebuilt from train_config.json; the
// checkpoint can only load into the exact architecture it was
// saved from, so generation reuses the recorded hyperparameters
// rather than trusting CLI flags. Dropout is configured to 0
// here — generation never trains.

use anyhow::{ensure, Result};
use tokenizers::Tokenizer;

use crate::domain::traits::TextGenerator;
use crate::infra::{
    checkpoint::CheckpointManager,
    tokenizer_store::{end_token_id, model_vocab_size, TokenizerStore},
};
use crate::ml::gpt::Gpt;

use super::train_use_case::TrainBackend;

pub struct GenerateUseCase {
    tokenizer: Tokenizer,
    gpt:       Gpt<TrainBackend>,
    end_id:    u32,
}

impl GenerateUseCase {
    /// Rebuild the trained model from a checkpoint directory.
    pub fn new(checkpoint_dir: String) -> Result<Self> {
        let tok_store = TokenizerStore::new(&checkpoint_dir);
        let tokenizer = tok_store.load()?;
        let end_id    = end_token_id(&tokenizer)?;

        let ckpt = CheckpointManager::new(&checkpoint_dir);
        let cfg  = ckpt.load_config()?;

        let device = burn::backend::wgpu::WgpuDevice::default();
        let model_cfg = cfg
            .model_config(model_vocab_size(&tokenizer))?
            .with_dropout_rate(0.0);

        let mut gpt = Gpt::<TrainBackend>::new(model_cfg, device)?;
        gpt.restore_from(&ckpt)?;
        tracing::info!("Model loaded from checkpoint ({} parameters)", gpt.num_params());

        Ok(Self { tokenizer, gpt, end_id })
    }
}

impl TextGenerator for GenerateUseCase {
    fn complete(&mut self, prompt: &str, max_length: usize) -> Result<String> {
        let enc = self
            .tokenizer
            .encode(prompt, false)
            .map_err(|e| anyhow::anyhow!("Prompt tokenisation error: {e}"))?;
        let seed: Vec<u32> = enc.get_ids().to_vec();
        ensure!(
            !seed.is_empty(),
            "Prompt '{prompt}' produced no tokens — try a longer prompt"
        );

        let ids = self.gpt.predict(&seed, max_length, self.end_id)?;
        tracing::debug!("Generated {} tokens from a {}-token prompt", ids.len(), seed.len());

        self.tokenizer
            .decode(&ids, true)
            .map_err(|e| anyhow::anyhow!("Decoding error: {e}"))
    }
}
