use burn::data::dataset::Dataset;

use crate::domain::sequence::TokenSequence;

/// In-memory dataset of uniform-length token sequences.
/// The chunker guarantees the uniform length; this type just
/// hands sequences to Burn's DataLoader by index.
pub struct SequenceDataset {
    sequences: Vec<TokenSequence>,
}

impl SequenceDataset {
    pub fn new(sequences: Vec<TokenSequence>) -> Self {
        Self { sequences }
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }
}

impl Dataset<TokenSequence> for SequenceDataset {
    fn get(&self, index: usize) -> Option<TokenSequence> {
        self.sequences.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.sequences.len()
    }
}
