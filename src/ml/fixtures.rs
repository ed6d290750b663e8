// In-memory BatchSource and CtrModel used by the orchestration tests.
//
// ScriptedModel derives every output from the batch contents, so a
// test can predict exactly what the evaluation runner must aggregate:
//   score_i   = first index of example i / 1000
//   logloss_i = first index of example i / 100
//   attn_j    = one column holding (first index + j)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::attention::AttentionMap;
use crate::domain::batch::{Batch, EvalSplit};
use crate::domain::traits::{BatchSource, CtrModel, EvalOutput, StepSummary, TrainOutput};

#[derive(Debug, Default)]
pub struct ScriptedModel {
    pub step:         u64,
    /// train_step fails once the step counter reaches this value
    pub fail_at_step: Option<u64>,
}

fn first_indices(batch: &Batch) -> impl Iterator<Item = u32> + '_ {
    batch.indices.chunks(batch.field_size).map(|row| row[0])
}

impl CtrModel for ScriptedModel {
    fn train_step(&mut self, batch: &Batch) -> Result<TrainOutput> {
        if self.fail_at_step == Some(self.step) {
            anyhow::bail!("scripted failure at step {}", self.step);
        }
        self.step += 1;
        let sigmoid: Vec<f32> = batch.labels.iter().map(|&y| 0.2 + 0.6 * y).collect();
        let summary = StepSummary {
            global_step:  self.step,
            overall_loss: 0.75,
            mean_logloss: 0.5,
            reg_loss:     0.25,
        };
        Ok(TrainOutput {
            global_step:  self.step,
            summary,
            reg_loss:     0.25,
            mean_logloss: 0.5,
            sigmoid,
        })
    }

    fn eval_step(&self, batch: &Batch) -> Result<EvalOutput> {
        let firsts: Vec<u32> = first_indices(batch).collect();
        let attn = |j: f32| {
            AttentionMap::new(1, firsts.iter().map(|&i| i as f32 + j).collect())
        };
        Ok(EvalOutput {
            sigmoid:   firsts.iter().map(|&i| i as f32 / 1000.0).collect(),
            logloss:   firsts.iter().map(|&i| i as f32 / 100.0).collect(),
            attention: [attn(0.0), attn(1.0), attn(2.0), attn(3.0)],
        })
    }

    fn global_step(&self) -> u64 {
        self.step
    }

    fn save_checkpoint(&self, stem: &Path) -> Result<PathBuf> {
        let path = stem.with_extension("ckpt");
        fs::write(&path, self.step.to_string())?;
        Ok(path)
    }
}

/// Pre-built batches served in order.
#[derive(Debug, Default)]
pub struct VecSource {
    pub field_size:   usize,
    pub feature_size: usize,
    pub train:        Vec<Batch>,
    pub valid:        Vec<Batch>,
    pub test:         Vec<Batch>,
    cursor:           usize,
    has_next:         bool,
}

impl VecSource {
    /// `n_train` / `n_test` full batches of `batch_size`; example ids are
    /// consecutive and labels alternate 0, 1, 0, 1, ...
    pub fn uniform(field_size: usize, feature_size: usize, batch_size: usize, n_train: usize, n_test: usize) -> Self {
        let make = |n: usize, offset: u32| -> Vec<Batch> {
            (0..n)
                .map(|b| {
                    let ids = (0..batch_size).map(|i| offset + (b * batch_size + i) as u32);
                    let indices = ids
                        .clone()
                        .flat_map(|id| std::iter::repeat(id % feature_size as u32).take(field_size))
                        .collect();
                    let labels = ids.map(|id| (id % 2) as f32).collect();
                    Batch::new(indices, labels, field_size)
                })
                .collect()
        };
        Self {
            field_size,
            feature_size,
            train: make(n_train, 0),
            valid: make(n_test, 0),
            test: make(n_test, 0),
            cursor: 0,
            has_next: false,
        }
    }

    pub fn with_test(mut self, test: Vec<Batch>) -> Self {
        self.test = test;
        self
    }
}

impl BatchSource for VecSource {
    fn start_epoch(&mut self) {
        self.cursor = 0;
        self.has_next = !self.train.is_empty();
    }

    fn has_next(&self) -> bool {
        self.has_next
    }

    fn next_train_batch(&mut self) -> Option<Batch> {
        if !self.has_next {
            return None;
        }
        let batch = self.train[self.cursor].clone();
        self.cursor += 1;
        if self.cursor == self.train.len() {
            self.has_next = false;
        }
        Some(batch)
    }

    fn batch_index(&self) -> usize {
        self.cursor
    }

    fn eval_batches(&self, split: EvalSplit) -> Box<dyn Iterator<Item = Batch> + '_> {
        let batches = match split {
            EvalSplit::Validation => &self.valid,
            EvalSplit::Test       => &self.test,
        };
        Box::new(batches.iter().cloned())
    }

    fn field_size(&self) -> usize {
        self.field_size
    }

    fn feature_size(&self) -> usize {
        self.feature_size
    }
}
