// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Builds, saves and loads the word-level tokenizer. The same
// tokenizer.json must serve both training and generation, so it
// lives in the checkpoint directory next to the weights.
//
// The vocabulary is built from corpus word frequencies and the
// tokenizer JSON is written directly in the HuggingFace format
// that Tokenizer::from_file expects — this sidesteps the
// Trainer/ModelWrapper type mismatch in the tokenizers crate's
// in-process training API.
//
// Special tokens (fixed ids):
//   <pad> = 0   pads the tail of the final training window
//   <unk> = 1   any word not in the vocabulary
//   </s>  = 2   end-of-sequence — separates documents in the
//               training stream and terminates generation
//
// The model reserves one extra id beyond the tokenizer's
// vocabulary (see model_vocab_size), mirroring vocabularies
// whose id range is one larger than their mapping.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

pub const PAD_TOKEN: &str = "<pad>";
pub const UNK_TOKEN: &str = "<unk>";
pub const END_TOKEN: &str = "</s>";

/// Number of ids claimed by the special tokens above
const SPECIAL_TOKENS: usize = 3;

/// The embedding/logit vocabulary size for a given tokenizer:
/// every tokenizer id plus one reserved id.
pub fn model_vocab_size(tokenizer: &Tokenizer) -> usize {
    tokenizer.get_vocab_size(true) + 1
}

/// Id of the end-of-sequence token used to stop generation.
pub fn end_token_id(tokenizer: &Tokenizer) -> Result<u32> {
    tokenizer
        .token_to_id(END_TOKEN)
        .with_context(|| format!("Tokenizer has no '{END_TOKEN}' token"))
}

/// Id used to pad the tail of the final training window.
pub fn pad_token_id(tokenizer: &Tokenizer) -> Result<u32> {
    tokenizer
        .token_to_id(PAD_TOKEN)
        .with_context(|| format!("Tokenizer has no '{PAD_TOKEN}' token"))
}

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load existing tokenizer or build a new one from texts
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading existing tokenizer from disk");
            self.load()
        } else {
            tracing::info!("Building new tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    /// Load a previously saved tokenizer from its JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    /// Build a word-level vocabulary from the corpus and write a
    /// tokenizer JSON that Tokenizer::from_file can load back.
    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: Count word frequencies ────────────────────────────────────
        use std::collections::HashMap;
        let mut freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in text.split_whitespace() {
                let w = word.to_lowercase();
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        // Most frequent first; ties broken alphabetically so the
        // vocabulary is stable across runs on the same corpus
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(SPECIAL_TOKENS));

        // ── Step 2: Build vocab JSON ──────────────────────────────────────────
        let mut vocab = serde_json::json!({
            PAD_TOKEN: 0,
            UNK_TOKEN: 1,
            END_TOKEN: 2,
        });

        let mut next_id = SPECIAL_TOKENS;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        // ── Step 3: Write tokenizer JSON in HuggingFace format ────────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1, "content": UNK_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 2, "content": END_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "Lowercase"
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": UNK_TOKEN
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(
            &tok_path,
            serde_json::to_string_pretty(&tokenizer_json)?
        ).with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            next_id,
            tok_path.display()
        );

        // Load back as a proper Tokenizer instance
        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn sample_corpus() -> Vec<String> {
        vec![
            "the cat sat on the mat".to_string(),
            "the dog sat on the log".to_string(),
        ]
    }

    #[test]
    fn test_build_assigns_special_ids() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path().to_str().unwrap());

        let tok = store.load_or_build(&sample_corpus(), 64).unwrap();
        assert_eq!(tok.token_to_id(PAD_TOKEN), Some(0));
        assert_eq!(tok.token_to_id(UNK_TOKEN), Some(1));
        assert_eq!(tok.token_to_id(END_TOKEN), Some(2));
    }

    #[test]
    fn test_encodes_known_words() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path().to_str().unwrap());
        let tok   = store.load_or_build(&sample_corpus(), 64).unwrap();

        let enc = tok.encode("the cat", false).unwrap();
        assert_eq!(enc.get_ids().len(), 2);
        // "the" is the most frequent word → first non-special id
        assert_eq!(enc.get_ids()[0], SPECIAL_TOKENS as u32);
    }

    #[test]
    fn test_model_vocab_reserves_one_extra_id() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path().to_str().unwrap());
        let tok   = store.load_or_build(&sample_corpus(), 64).unwrap();

        assert_eq!(model_vocab_size(&tok), tok.get_vocab_size(true) + 1);
    }

    #[test]
    fn test_second_call_loads_the_saved_tokenizer() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path().to_str().unwrap());

        let first  = store.load_or_build(&sample_corpus(), 64).unwrap();
        let second = store.load_or_build(&[], 64).unwrap();
        assert_eq!(
            first.get_vocab_size(true),
            second.get_vocab_size(true)
        );
    }
}
