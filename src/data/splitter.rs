// ============================================================
// Layer 4 — Validation Holdout
// ============================================================
// Used only when a dataset ships without valid.txt: a seeded
// shuffle of the training rows, then the tail becomes the
// validation split.
//
// Click logs are usually ordered by time, so splitting without
// the shuffle would hand validation only the newest rows.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `rows` with `seed` and keep `train_fraction` of them (rounded)
/// for training. Returns `(train, holdout)`.
pub fn split_train_val<T>(mut rows: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    rows.shuffle(&mut StdRng::seed_from_u64(seed));

    let total = rows.len();
    let keep = ((total as f64 * train_fraction).round() as usize).min(total);
    let holdout = rows.split_off(keep);

    tracing::debug!("Held out {} of {} training rows (seed {})", holdout.len(), total, seed);
    (rows, holdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holdout_size_is_rounded_fraction() {
        let (train, holdout) = split_train_val((0..100).collect::<Vec<u32>>(), 0.9, 7);
        assert_eq!((train.len(), holdout.len()), (90, 10));

        let (train, holdout) = split_train_val((0..7).collect::<Vec<u32>>(), 0.5, 7);
        assert_eq!((train.len(), holdout.len()), (4, 3));
    }

    #[test]
    fn test_split_is_a_partition() {
        let (train, holdout) = split_train_val((0..50).collect::<Vec<u32>>(), 0.7, 3);
        let mut all: Vec<u32> = train.into_iter().chain(holdout).collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<u32>>());
    }

    #[test]
    fn test_seed_controls_the_split() {
        let rows = || (0..40).collect::<Vec<u32>>();
        assert_eq!(split_train_val(rows(), 0.75, 2018), split_train_val(rows(), 0.75, 2018));
        assert_ne!(split_train_val(rows(), 0.75, 2018), split_train_val(rows(), 0.75, 2019));
    }

    #[test]
    fn test_edges() {
        let (train, holdout) = split_train_val(Vec::<u32>::new(), 0.8, 0);
        assert!(train.is_empty() && holdout.is_empty());

        let (train, holdout) = split_train_val((0..10).collect::<Vec<u32>>(), 1.0, 0);
        assert_eq!(train.len(), 10);
        assert!(holdout.is_empty());
    }
}
