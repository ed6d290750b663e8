// ============================================================
// Layer 4 — CTR Batcher
// ============================================================
// Turns a domain Batch (plain Vecs) into tensors on a device.
//
//   Input:  Batch { indices: N·F u32, labels: N f32 }
//   Output: CtrBatch { indices: Int [N, F], labels: Float [N] }
//
// Indices are already flat row-major, so building the 2-D
// tensor is a single from_ints + reshape.
//
// Generic over the backend so the same batcher feeds both the
// autodiff training model and the inner inference model.

use burn::prelude::*;

use crate::domain::batch::Batch;

#[derive(Debug, Clone)]
pub struct CtrBatch<B: Backend> {
    /// [batch_size, field_size]
    pub indices: Tensor<B, 2, Int>,

    /// [batch_size], 0.0 or 1.0
    pub labels: Tensor<B, 1>,
}

#[derive(Clone, Debug)]
pub struct CtrBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> CtrBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    pub fn batch(&self, batch: &Batch) -> CtrBatch<B> {
        // Burn Int tensors are built from i32
        let flat: Vec<i32> = batch.indices.iter().map(|&i| i as i32).collect();

        let indices = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([batch.len(), batch.field_size]);

        let labels = Tensor::<B, 1>::from_floats(batch.labels.as_slice(), &self.device);

        CtrBatch { indices, labels }
    }
}
