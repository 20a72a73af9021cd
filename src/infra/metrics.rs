// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per training epoch so learning curves can
// be plotted after the run.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average cross-entropy over training batches
//   - val_loss:   average cross-entropy on the held-out set
//                 (NaN when no validation set was supplied)
//   - perplexity: exp(val_loss), or exp(train_loss) without a
//                 validation set
//
// Output file: checkpoints/metrics.csv
//
// Example:
//   epoch,train_loss,val_loss,perplexity
//   1,6.124500,6.089200,441.283104
//   2,5.390100,5.414300,224.612478
//
// A random untrained model starts near ln(vocab_size);
// val_loss rising while train_loss falls means overfitting.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training batches
    pub train_loss: f64,

    /// Average cross-entropy loss on the validation set.
    /// NaN when the run had no validation split.
    pub val_loss: f64,

    /// exp of the reported loss — "how many tokens the model is
    /// effectively choosing between" at each position
    pub perplexity: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, perplexity: f64) -> Self {
        Self { epoch, train_loss, val_loss, perplexity }
    }

    /// True if this epoch improved on the previous best loss.
    /// Prefers validation loss, falls back to training loss.
    pub fn is_improvement(&self, best_loss: f64) -> bool {
        let loss = if self.val_loss.is_finite() { self.val_loss } else { self.train_loss };
        loss < best_loss
    }
}

/// Appends epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger, writing the CSV header if the
    /// file doesn't exist yet (appending across runs is allowed).
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,perplexity")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.val_loss, m.perplexity,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement_prefers_val_loss() {
        let m = EpochMetrics::new(2, 2.5, 2.3, 9.97);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_is_improvement_falls_back_to_train_loss() {
        let m = EpochMetrics::new(1, 2.5, f64::NAN, 12.18);
        assert!(m.is_improvement(2.6));
        assert!(!m.is_improvement(2.4));
    }

    #[test]
    fn test_rows_are_appended() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path().to_str().unwrap()).unwrap();

        logger.log(&EpochMetrics::new(1, 6.1, 6.0, 403.42)).unwrap();
        logger.log(&EpochMetrics::new(2, 5.4, 5.5, 244.69)).unwrap();

        let contents = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,val_loss,perplexity");
        assert!(lines[1].starts_with("1,6.1"));
    }
}
