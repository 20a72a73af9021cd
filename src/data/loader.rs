// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Loads plain-text files from a directory. One file becomes one
// Document; the training pipeline later joins them into a single
// token stream with an end-of-sequence marker between documents.
//
// A file that cannot be read is logged and skipped — one broken
// file must not abort a whole training run. A missing directory
// yields an empty corpus (the use case decides whether that is
// fatal).
//
// Reference: Rust Book §9 (Error Handling), §12 (I/O)

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::document::Document;
use crate::domain::traits::CorpusSource;

/// Loads all .txt files from a given directory.
/// Implements the CorpusSource trait from Layer 3.
pub struct TextLoader {
    /// Path to the directory containing .txt files
    dir: String,
}

impl TextLoader {
    /// Create a new TextLoader pointed at a directory
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CorpusSource for TextLoader {
    fn load_all(&self) -> Result<Vec<Document>> {
        let dir = Path::new(&self.dir);

        if !dir.exists() {
            tracing::warn!(
                "Corpus directory '{}' does not exist — returning empty corpus",
                self.dir
            );
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();

        for entry in fs::read_dir(dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir))?
        {
            let entry = entry?;
            let path  = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }

            match load_single_text(&path) {
                Ok(doc) if !doc.is_blank() => {
                    tracing::debug!("Loaded: {} ({} chars)", doc.source, doc.text.len());
                    docs.push(doc);
                }
                Ok(doc) => {
                    tracing::debug!("Skipping blank file '{}'", doc.source);
                }
                // Log a warning but continue — don't fail on one bad file
                Err(e) => {
                    tracing::warn!("Skipping '{}': {}", path.display(), e);
                }
            }
        }

        tracing::info!("Successfully loaded {} documents", docs.len());
        Ok(docs)
    }
}

/// Read a single .txt file into a Document.
/// The filename is kept as the source identifier.
fn load_single_text(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(Document::new(source, text))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loads_txt_and_ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("a.txt")).unwrap();
        writeln!(f, "hello corpus").unwrap();
        let mut g = fs::File::create(dir.path().join("b.md")).unwrap();
        writeln!(g, "not loaded").unwrap();

        let loader = TextLoader::new(dir.path().to_str().unwrap());
        let docs   = loader.load_all().unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "a.txt");
        assert!(docs[0].text.contains("hello corpus"));
    }

    #[test]
    fn test_missing_directory_gives_empty_corpus() {
        let loader = TextLoader::new("definitely/not/a/real/dir");
        let docs   = loader.load_all().unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_blank_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.txt"), "   \n  ").unwrap();

        let loader = TextLoader::new(dir.path().to_str().unwrap());
        assert!(loader.load_all().unwrap().is_empty());
    }
}
