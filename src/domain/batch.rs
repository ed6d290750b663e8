// ============================================================
// Layer 3 — Batch Domain Type
// ============================================================
// A batch is a group of examples, each described by exactly
// `field_size` categorical feature indices and one binary label.
//
// Indices are stored flat in row-major order:
//   [ex0_f0, ex0_f1, ..., ex0_fF, ex1_f0, ...]
// so the logical shape is (batch_size, field_size).
//
// Labels are already rank-1 (one value per example), which is
// the "squeezed" form every consumer expects.

use serde::{Deserialize, Serialize};

/// One batch of examples handed from a BatchSource to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Feature indices, flat, shape (len, field_size)
    pub indices: Vec<u32>,

    /// Binary labels, one per example (0.0 or 1.0)
    pub labels: Vec<f32>,

    /// Number of categorical fields per example
    pub field_size: usize,
}

impl Batch {
    pub fn new(indices: Vec<u32>, labels: Vec<f32>, field_size: usize) -> Self {
        debug_assert_eq!(indices.len(), labels.len() * field_size);
        Self { indices, labels, field_size }
    }

    /// Number of examples in this batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Labels cast to integers, the form AUC is computed on.
    pub fn int_labels(&self) -> Vec<u8> {
        self.labels.iter().map(|&y| if y >= 0.5 { 1 } else { 0 }).collect()
    }
}

/// Which held-out split an evaluation pass drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalSplit {
    Validation,
    Test,
}

impl EvalSplit {
    pub fn from_validation_flag(validation: bool) -> Self {
        if validation { EvalSplit::Validation } else { EvalSplit::Test }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_counts_examples_not_indices() {
        let b = Batch::new(vec![1, 2, 3, 4, 5, 6], vec![0.0, 1.0], 3);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_int_labels() {
        let b = Batch::new(vec![0, 0, 0], vec![1.0, 0.0, 1.0], 1);
        assert_eq!(b.int_labels(), vec![1, 0, 1]);
    }

    #[test]
    fn test_split_from_flag() {
        assert_eq!(EvalSplit::from_validation_flag(true), EvalSplit::Validation);
        assert_eq!(EvalSplit::from_validation_flag(false), EvalSplit::Test);
    }
}
