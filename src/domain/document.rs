// ============================================================
// Layer 3 — Document Domain Type
// ============================================================
// Represents a single text file loaded from disk — a source
// name and its raw content, nothing else. By the time a
// Document exists, no cleaning or tokenisation has happened.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A raw document loaded from disk, before any cleaning
/// or tokenisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The filename — kept so log lines can say which file
    /// contributed which part of the training corpus
    pub source: String,

    /// The full text content of the file
    pub text: String,
}

impl Document {
    /// Create a new Document. `impl Into<String>` lets callers
    /// pass either &str or String.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text:   text.into(),
        }
    }

    /// True when the document carries no usable text at all
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
