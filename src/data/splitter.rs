// ============================================================
// Layer 4 — Train/Dev Splitter
// ============================================================
// Used when no separate dev file is given: a seeded shuffle
// carves a dev set out of the training pairs.
//
// The RNG is seeded from the training config so two runs with
// the same seed evaluate on the same dev pairs and their F1
// scores are comparable.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split off `dev_fraction` of them.
///
/// # Returns
/// A tuple (train_samples, dev_samples)
pub fn split_train_dev<T>(mut samples: Vec<T>, dev_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let dev_size = ((total as f64) * dev_fraction.clamp(0.0, 1.0)).round() as usize;

    // split_off leaves [0..at] as training and returns [at..] as dev
    let dev = samples.split_off(total - dev_size.min(total));

    tracing::debug!(
        "Dataset split: {} training, {} dev (seed {})",
        samples.len(),
        dev.len(),
        seed,
    );

    (samples, dev)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, dev) = split_train_dev(items, 0.1, 7);
        assert_eq!(train.len(), 90);
        assert_eq!(dev.len(), 10);
    }

    #[test]
    fn test_same_seed_same_split() {
        let (_, dev_a) = split_train_dev((0..50).collect::<Vec<usize>>(), 0.2, 42);
        let (_, dev_b) = split_train_dev((0..50).collect::<Vec<usize>>(), 0.2, 42);
        assert_eq!(dev_a, dev_b);
    }

    #[test]
    fn test_all_items_preserved() {
        let (mut train, dev) = split_train_dev((0..30).collect::<Vec<usize>>(), 0.3, 1);
        train.extend(dev);
        train.sort_unstable();
        assert_eq!(train, (0..30).collect::<Vec<usize>>());
    }

    #[test]
    fn test_empty_dataset() {
        let (train, dev) = split_train_dev(Vec::<usize>::new(), 0.5, 0);
        assert!(train.is_empty());
        assert!(dev.is_empty());
    }
}
