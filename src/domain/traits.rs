// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The orchestrator never talks to Burn or to the filesystem
// loader directly. It is written against these two traits:
//
//   BatchSource → produces ordered train / validation / test
//                 batches and signals exhaustion with None
//   CtrModel    → a stateful computation unit that owns the
//                 learnable parameters and the global step
//
// Implementations:
//   - CtrDataLoader (data layer)  implements BatchSource
//   - ModelSession  (ml layer)    implements CtrModel
//   - in-memory fixtures in tests implement both
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::attention::AttentionMap;
use crate::domain::batch::{Batch, EvalSplit};

// ─── BatchSource ──────────────────────────────────────────────────────────────
/// Any component that can feed batches to the training loop.
pub trait BatchSource {
    /// Rewind the training split for a new epoch (has_next becomes true).
    fn start_epoch(&mut self);

    /// Whether the current epoch still has training batches left.
    fn has_next(&self) -> bool;

    /// Next training batch, or None once the epoch is exhausted.
    fn next_train_batch(&mut self) -> Option<Batch>;

    /// 1-based index of the training batch most recently served.
    fn batch_index(&self) -> usize;

    /// A fresh pass over a held-out split, in file order.
    fn eval_batches(&self, split: EvalSplit) -> Box<dyn Iterator<Item = Batch> + '_>;

    /// Number of categorical fields per example.
    fn field_size(&self) -> usize;

    /// Number of distinct feature indices (embedding rows).
    fn feature_size(&self) -> usize;
}

// ─── Step outputs ─────────────────────────────────────────────────────────────
/// Telemetry record emitted once per training batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub global_step:  u64,
    pub overall_loss: f64,
    pub mean_logloss: f64,
    pub reg_loss:     f64,
}

/// Everything one training step hands back to the orchestrator.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    /// Global step after this update (already incremented)
    pub global_step:  u64,
    pub summary:      StepSummary,
    pub reg_loss:     f64,
    pub mean_logloss: f64,
    /// Sigmoid scores, one per example in the batch
    pub sigmoid:      Vec<f32>,
}

/// Inference-mode outputs for one batch.
#[derive(Debug, Clone)]
pub struct EvalOutput {
    /// Sigmoid scores, one per example
    pub sigmoid:   Vec<f32>,
    /// Per-example binary log-loss
    pub logloss:   Vec<f32>,
    /// attn_1, attn_2, attn_3, attn_k — one row per example each
    pub attention: [AttentionMap; 4],
}

// ─── CtrModel ─────────────────────────────────────────────────────────────────
/// A click-prediction model with mutable parameters and a step counter.
///
/// `train_step` is the only operation that mutates parameters, and it
/// advances the global step by exactly one. `eval_step` takes `&self`,
/// so evaluation can never change the parameter snapshot it observes.
pub trait CtrModel {
    fn train_step(&mut self, batch: &Batch) -> Result<TrainOutput>;

    fn eval_step(&self, batch: &Batch) -> Result<EvalOutput>;

    fn global_step(&self) -> u64;

    /// Persist the full model state under `stem`, returning the file written.
    fn save_checkpoint(&self, stem: &Path) -> Result<PathBuf>;
}
