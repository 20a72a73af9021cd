// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits that define the core concepts
// of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - NO ML-specific code
//   - Only plain Rust structs, enums, and traits
//
// This keeps the vocabulary of the system (documents, token
// sequences, generation) testable without a GPU and free of
// framework noise.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A loaded document from disk
pub mod document;

// A fixed-length sequence of token ids
pub mod sequence;

// Core abstractions (traits) that other layers implement
pub mod traits;
