// ============================================================
// Layer 3 — TokenSequence Domain Type
// ============================================================
// One training or generation example: an ordered run of
// integer token ids. Every id must lie in [0, vocab_size) —
// the tokenizer guarantees this on the way in.
//
// Within a batch all sequences share one length (the chunker
// pads the tail window), which is what lets the batcher stack
// them into a single [batch, len] tensor.
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

/// A fixed-length run of token ids — the unit the dataset,
/// batcher and training loop all operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSequence {
    /// Token ids in order, already padded to the window length
    pub ids: Vec<u32>,
}

impl TokenSequence {
    /// Create a new TokenSequence from raw ids
    pub fn new(ids: Vec<u32>) -> Self {
        Self { ids }
    }

    /// Number of token positions in this sequence
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the sequence holds no tokens
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
