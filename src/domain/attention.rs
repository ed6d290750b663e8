// ============================================================
// Layer 3 — Attention Maps
// ============================================================
// The model emits four attention tensors per batch. Each one is
// reduced to a 2-D matrix with one row per example, so a whole
// evaluation pass can be stacked along the batch axis and
// written out as a plain delimited file.

use serde::{Deserialize, Serialize};

/// A dense row-major matrix of attention weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionMap {
    /// Number of columns per row
    pub cols: usize,

    /// Row-major values, `rows() * cols` long
    pub values: Vec<f32>,
}

impl AttentionMap {
    pub fn new(cols: usize, values: Vec<f32>) -> Self {
        debug_assert!(cols == 0 || values.len() % cols == 0);
        Self { cols, values }
    }

    pub fn empty(cols: usize) -> Self {
        Self { cols, values: Vec::new() }
    }

    pub fn rows(&self) -> usize {
        if self.cols == 0 { 0 } else { self.values.len() / self.cols }
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.cols..(i + 1) * self.cols]
    }

    /// Stack every per-batch map except the last one along the row axis.
    ///
    /// The final batch of a pass may be partial, so it never reaches
    /// the exported attention maps even though the metrics of the
    /// same pass do include it. A pass with a single batch therefore
    /// yields an empty map.
    pub fn concat_all_but_last(batches: &[AttentionMap]) -> AttentionMap {
        let Some((_, kept)) = batches.split_last() else {
            return AttentionMap::empty(0);
        };
        let cols = batches[0].cols;
        let values = kept
            .iter()
            .flat_map(|m| m.values.iter().copied())
            .collect();
        AttentionMap::new(cols, values)
    }
}
