// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Persists the model every `num_iter_per_save` global steps and
// keeps only the most recent MAX_TO_KEEP checkpoints on disk.
//
// What lives in the run directory:
//   1. model-<step>.mpk     — full model parameters
//   2. checkpoint.json      — latest step + retained steps
//   3. run_config.json      — the RunConfig used for training
//
// Writing the weights themselves is the model's job
// (CtrModel::save_checkpoint); this manager decides the name,
// tracks what is retained and evicts oldest-first.
//
// Why save the config separately?
//   `evaluate` has to rebuild the exact architecture before
//   the stored parameters can be loaded into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fs, path::PathBuf};

use crate::application::train_use_case::RunConfig;
use crate::domain::traits::CtrModel;
use crate::infra::layout::RunLayout;

/// Checkpoints retained on disk at any time.
pub const MAX_TO_KEEP: usize = 10;

/// Contents of checkpoint.json.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckpointIndex {
    pub latest_step:    Option<u64>,
    pub retained_steps: Vec<u64>,
}

pub struct CheckpointManager {
    layout:      RunLayout,
    max_to_keep: usize,
    /// (global_step, file written) oldest first
    retained:    VecDeque<(u64, PathBuf)>,
}

impl CheckpointManager {
    pub fn new(layout: RunLayout) -> Self {
        Self::with_max_to_keep(layout, MAX_TO_KEEP)
    }

    pub fn with_max_to_keep(layout: RunLayout, max_to_keep: usize) -> Self {
        Self { layout, max_to_keep, retained: VecDeque::new() }
    }

    /// Save `model` keyed by `global_step`, evicting the oldest checkpoint
    /// once more than `max_to_keep` exist.
    pub fn save<M: CtrModel>(&mut self, model: &M, global_step: u64) -> Result<PathBuf> {
        let stem = self.layout.checkpoint_stem(global_step);
        let written = model
            .save_checkpoint(&stem)
            .with_context(|| format!("Failed to save checkpoint at step {global_step}"))?;
        self.retained.push_back((global_step, written.clone()));

        while self.retained.len() > self.max_to_keep {
            if let Some((step, old)) = self.retained.pop_front() {
                fs::remove_file(&old).with_context(|| {
                    format!("Cannot remove old checkpoint '{}'", old.display())
                })?;
                tracing::debug!("Evicted checkpoint for step {}", step);
            }
        }

        self.write_index()?;
        Ok(written)
    }

    pub fn retained_steps(&self) -> Vec<u64> {
        self.retained.iter().map(|(s, _)| *s).collect()
    }

    fn write_index(&self) -> Result<()> {
        let index = CheckpointIndex {
            latest_step:    self.retained.back().map(|(s, _)| *s),
            retained_steps: self.retained_steps(),
        };
        let path = self.layout.checkpoint_index();
        fs::write(&path, serde_json::to_string_pretty(&index)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))
    }

    /// Read checkpoint.json for a finished (or interrupted) run.
    pub fn load_index(layout: &RunLayout) -> Result<CheckpointIndex> {
        let path = layout.checkpoint_index();
        let json = fs::read_to_string(&path).with_context(|| {
            format!("Cannot read '{}'. Has this trial saved a checkpoint yet?", path.display())
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Pick a retained checkpoint: the requested step, or the latest one.
    /// Returns the step and the stem to hand to the model loader.
    pub fn resolve(layout: &RunLayout, step: Option<u64>) -> Result<(u64, PathBuf)> {
        let index = Self::load_index(layout)?;
        let step = match step {
            Some(s) if index.retained_steps.contains(&s) => s,
            Some(s) => anyhow::bail!(
                "No retained checkpoint for step {s}; retained: {:?}",
                index.retained_steps
            ),
            None => index
                .latest_step
                .context("checkpoint.json lists no checkpoints")?,
        };
        Ok((step, layout.checkpoint_stem(step)))
    }

    /// Save the run configuration as pretty JSON next to the checkpoints.
    pub fn save_config(layout: &RunLayout, cfg: &RunConfig) -> Result<()> {
        let path = layout.config_file();
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(layout: &RunLayout) -> Result<RunConfig> {
        let path = layout.config_file();
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' for this trial.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}
