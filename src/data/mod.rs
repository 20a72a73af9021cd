// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw .txt files to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   .txt files
//       │
//       ▼
//   TextLoader        → reads files into raw text
//       │
//       ▼
//   Preprocessor      → cleans text (whitespace, encoding)
//       │
//       ▼
//   Tokenizer         → converts words to token id numbers
//       │
//       ▼
//   SequenceChunker   → slices the id stream into fixed windows
//       │
//       ▼
//   SequenceDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   SequenceBatcher   → stacks sequences into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads .txt files from a directory
pub mod loader;

/// Cleans and normalises raw text
pub mod preprocessor;

/// Slices token streams into fixed-length training windows
pub mod chunker;

/// Implements Burn's Dataset trait for token sequences
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
