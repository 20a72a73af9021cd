// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles sequences and splits them into a training set (used
// to update weights) and a validation set (used to measure loss
// on windows the optimiser never saw). Shuffling first matters
// because chunked windows arrive in document order — without it
// the validation set would come from a single document.
//
// Uses Fisher-Yates via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::seq::SliceRandom;

/// Randomly shuffle `items` and split into (train, validation).
///
/// `train_fraction` is the proportion kept for training,
/// e.g. 0.9 keeps 90% for training and holds out 10%.
pub fn split_train_val<T>(mut items: Vec<T>, train_fraction: f64) -> (Vec<T>, Vec<T>) {
    let mut rng = rand::thread_rng();
    items.shuffle(&mut rng);

    let total    = items.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] and returns them
    let val = items.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        items.len(),
        val.len(),
    );

    (items, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.9);
        assert_eq!(train.len(), 90);
        assert_eq!(val.len(),   10);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (train, val)      = split_train_val(items, 0.7);
        assert_eq!(train.len() + val.len(), 50);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.9);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_full_training_split() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val)      = split_train_val(items, 1.0);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
