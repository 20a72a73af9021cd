// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns shared by the other layers:
//
//   checkpoint.rs      — Saving and loading model weights.
//                        Uses Burn's CompactRecorder plus a
//                        train_config.json so inference can
//                        rebuild the exact architecture.
//
//   tokenizer_store.rs — Tokenizer persistence. Builds a
//                        word-level tokenizer from the corpus
//                        if none exists, or loads the saved one
//                        so training and generation share a
//                        vocabulary.
//
//   metrics.rs         — Per-epoch training metrics appended
//                        to a CSV file for later plotting.
//
// Reference: Burn Book §5 (Records and Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
