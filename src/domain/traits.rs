// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams of the system. Layers program against these traits
// instead of concrete types, so an implementation can be swapped
// without touching its callers:
//   - TextLoader implements CorpusSource
//   - a future StdinLoader could implement it too
//   - the application layer only ever sees CorpusSource
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::document::Document;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can supply raw training documents.
///
/// Implementations:
///   - TextLoader → loads from a directory of .txt files
pub trait CorpusSource {
    /// Load all available documents from this source.
    fn load_all(&self) -> Result<Vec<Document>>;
}

// ─── TextGenerator ────────────────────────────────────────────────────────────
/// Any component that can continue a text prompt.
///
/// Implementations:
///   - GenerateUseCase → greedy decoding with the trained model
pub trait TextGenerator {
    /// Extend `prompt` up to `max_length` tokens and return the
    /// full generated text (prompt included).
    fn complete(&mut self, prompt: &str, max_length: usize) -> Result<String>;
}
