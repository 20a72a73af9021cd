// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch/batch loop over shuffled sequence batches:
//
//   1. Rebuild the causal mask for the batch's sequence length
//   2. Forward pass on the autodiff backend (dropout active)
//   3. Teacher-forced cross-entropy, averaged over positions
//   4. Backward pass + one Adam step (gradients start fresh —
//      GradientsParams is rebuilt from scratch every batch)
//   5. Accumulate and periodically report the running loss
//
// The target at position t is the input token at position t —
// the same-position objective, not the shifted next-token one.
// A failure inside a batch (shape mismatch, non-finite loss
// turning into a panic downstream) is fatal to the run; nothing
// is caught or skipped.
//
// Validation, when a held-out dataset is supplied, runs on the
// inner backend via model.valid() so dropout is inert.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::SequenceBatcher, dataset::SequenceDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::mask::causal_mask;
use crate::ml::model::GptModel;

// ─── Training Options ─────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct TrainOptions {
    pub batch_size:    usize,
    pub epochs:        usize,
    pub learning_rate: f64,
    /// Report the running loss every this many batches
    #[config(default = 10)]
    pub log_every:     usize,
    #[config(default = 42)]
    pub shuffle_seed:  u64,
}

// ─── Loss ─────────────────────────────────────────────────────────────────────
/// Mean cross-entropy between the logits at every position and
/// the token present at that same position. Flattening to
/// [batch·len, vocab] and taking one mean is numerically the
/// same as averaging per-position batch means, because every
/// position contributes the same number of elements.
pub fn sequence_cross_entropy<B: Backend>(
    logits:  Tensor<B, 3>,
    targets: Tensor<B, 2, Int>,
) -> Tensor<B, 1> {
    let [batch, len, vocab] = logits.dims();
    let flat_logits  = logits.reshape([batch * len, vocab]);
    let flat_targets = targets.reshape([batch * len]);

    CrossEntropyLossConfig::new()
        .init(&flat_logits.device())
        .forward(flat_logits, flat_targets)
}

// ─── Training Loop ────────────────────────────────────────────────────────────
/// Train `model` in place and return it. Checkpointing and
/// metrics are optional collaborators: the bare facade `fit`
/// passes None for both, the train use case wires them in.
pub fn run_training<B: AutodiffBackend>(
    mut model:     GptModel<B>,
    device:        &B::Device,
    train_dataset: SequenceDataset,
    val_dataset:   Option<SequenceDataset>,
    opts:          &TrainOptions,
    checkpoints:   Option<&CheckpointManager>,
    metrics:       Option<&MetricsLogger>,
) -> Result<GptModel<B>> {
    // Adam:
    //   m = β1·m + (1-β1)·g        (first moment)
    //   v = β2·v + (1-β2)·g²       (second moment)
    //   θ = θ - lr·m̂ / (√v̂ + ε)
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    // ── Training data loader (autodiff backend) ───────────────────────────────
    let train_batcher = SequenceBatcher::<B>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(opts.batch_size)
        .shuffle(opts.shuffle_seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation loader (inner backend — no autodiff overhead) ──────────────
    let val_loader = val_dataset.map(|ds| {
        let batcher = SequenceBatcher::<B::InnerBackend>::new(device.clone());
        DataLoaderBuilder::new(batcher)
            .batch_size(opts.batch_size)
            .num_workers(1)
            .build(ds)
    });

    for epoch in 1..=opts.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;
        let mut running  = 0.0f64;

        for (index, batch) in train_loader.iter().enumerate() {
            let [_, seq_len] = batch.tokens.dims();
            let mask = causal_mask::<B>(seq_len, device);

            let logits = model.forward(batch.tokens.clone(), mask);
            let loss   = sequence_cross_entropy(logits, batch.tokens);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            loss_sum += loss_val;
            running  += loss_val;
            batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(opts.learning_rate, model, grads);

            if (index + 1) % opts.log_every == 0 {
                tracing::info!(
                    "Epoch {} batch {}: running loss {:.4}",
                    epoch,
                    index + 1,
                    running / opts.log_every as f64,
                );
                running = 0.0;
            }
        }

        let avg_train_loss = if batches > 0 {
            loss_sum / batches as f64
        } else {
            f64::NAN
        };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → GptModel<B::InnerBackend>, dropout inert
        let avg_val_loss = match &val_loader {
            Some(loader) => {
                let model_valid = model.valid();
                let mut val_sum     = 0.0f64;
                let mut val_batches = 0usize;

                for batch in loader.iter() {
                    let [_, seq_len] = batch.tokens.dims();
                    let mask   = causal_mask::<B::InnerBackend>(seq_len, device);
                    let logits = model_valid.forward(batch.tokens.clone(), mask);
                    let loss: f64 = sequence_cross_entropy(logits, batch.tokens)
                        .into_scalar()
                        .elem::<f64>();
                    val_sum     += loss;
                    val_batches += 1;
                }

                if val_batches > 0 { val_sum / val_batches as f64 } else { f64::NAN }
            }
            None => f64::NAN,
        };

        // Perplexity of the held-out set when available, of the
        // training set otherwise
        let perplexity = if avg_val_loss.is_finite() {
            avg_val_loss.exp()
        } else {
            avg_train_loss.exp()
        };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | ppl={:.2}",
            epoch, opts.epochs, avg_train_loss, avg_val_loss, perplexity,
        );

        if let Some(ckpt) = checkpoints {
            ckpt.save_model(&model, epoch)?;
            tracing::info!("Checkpoint saved for epoch {}", epoch);
        }
        if let Some(log) = metrics {
            log.log(&EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, perplexity))?;
        }
    }

    tracing::info!("Training complete");
    Ok(model)
}
