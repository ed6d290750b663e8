// ============================================================
// Layer 6 — Run Layout
// ============================================================
// All artifact locations are derived from four values:
// the performance root, the log root, the dataset name and
// the trial id. Nothing else in the crate builds paths.
//
//   performance/
//     example.001.pref             ← performance log
//     ml/
//       001.tst.299.1.csv          ← attention exports
//       ...
//   logs/
//     example/
//       train_001/
//         model-100.mpk            ← checkpoints
//         checkpoint.json          ← latest + retained steps
//         run_config.json          ← config snapshot
//         events.jsonl             ← per-step telemetry

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::application::train_use_case::RunConfig;

#[derive(Debug, Clone)]
pub struct RunLayout {
    performance_dir: PathBuf,
    log_dir:         PathBuf,
    dataset:         String,
    trial_id:        String,
}

impl RunLayout {
    pub fn new(
        performance_dir: impl Into<PathBuf>,
        log_dir:         impl Into<PathBuf>,
        dataset:         impl Into<String>,
        trial_id:        impl Into<String>,
    ) -> Self {
        Self {
            performance_dir: performance_dir.into(),
            log_dir:         log_dir.into(),
            dataset:         dataset.into(),
            trial_id:        trial_id.into(),
        }
    }

    pub fn from_config(cfg: &RunConfig) -> Self {
        Self::new(&cfg.performance_dir, &cfg.log_dir, &cfg.dataset, &cfg.trial_id)
    }

    /// `<performance>/<dataset>.<trial>.pref`
    pub fn performance_file(&self) -> PathBuf {
        self.performance_dir
            .join(format!("{}.{}.pref", self.dataset, self.trial_id))
    }

    pub fn attention_dir(&self) -> PathBuf {
        self.performance_dir.join("ml")
    }

    /// `<performance>/ml/<trial>.tst.<epoch>.<index>.csv`, index is 1-based
    pub fn attention_file(&self, epoch: usize, index: usize) -> PathBuf {
        self.attention_dir()
            .join(format!("{}.tst.{}.{}.csv", self.trial_id, epoch, index))
    }

    /// `<logs>/<dataset>/train_<trial>`
    pub fn run_dir(&self) -> PathBuf {
        self.log_dir
            .join(&self.dataset)
            .join(format!("train_{}", self.trial_id))
    }

    /// Checkpoint path without extension; the recorder appends its own.
    pub fn checkpoint_stem(&self, global_step: u64) -> PathBuf {
        self.run_dir().join(format!("model-{global_step}"))
    }

    pub fn checkpoint_index(&self) -> PathBuf {
        self.run_dir().join("checkpoint.json")
    }

    pub fn config_file(&self) -> PathBuf {
        self.run_dir().join("run_config.json")
    }

    pub fn events_file(&self) -> PathBuf {
        self.run_dir().join("events.jsonl")
    }

    /// Create every directory the run writes into (`mkdir -p` semantics).
    pub fn create_folder_tree(&self) -> Result<()> {
        for dir in [self.performance_dir.clone(), self.attention_dir(), self.run_dir()] {
            create_dir(&dir)?;
        }
        Ok(())
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create directory '{}'", dir.display()))
}
