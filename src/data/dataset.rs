use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One example: a label and exactly `field_size` feature indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtrSample {
    pub indices: Vec<u32>,
    pub label:   f32,
}

impl CtrSample {
    pub fn new(indices: Vec<u32>, label: f32) -> Self {
        Self { indices, label }
    }

    pub fn max_index(&self) -> Option<u32> {
        self.indices.iter().copied().max()
    }
}

#[derive(Debug)]
pub struct CtrDataset {
    samples: Vec<CtrSample>,
}

impl CtrDataset {
    pub fn new(samples: Vec<CtrSample>) -> Self { Self { samples } }
}

impl Dataset<CtrSample> for CtrDataset {
    fn get(&self, index: usize) -> Option<CtrSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
