// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Runs one training trial end to end:
//
//   Step 1: Validate the configuration
//   Step 2: Create the folder tree         (Layer 6 - infra)
//   Step 3: Load train/valid/test splits   (Layer 4 - data)
//   Step 4: Build the model session        (Layer 5 - ml)
//   Step 5: Snapshot the config            (Layer 6 - infra)
//   Step 6: Run the epoch loop             (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::loader::CtrDataLoader;
use crate::domain::batch::EvalSplit;
use crate::domain::traits::BatchSource;
use crate::infra::{checkpoint::CheckpointManager, layout::RunLayout};
use crate::ml::{
    session::build_session,
    trainer::{run_model, RunSummary},
    TrainBackend,
};

// ─── Run Configuration ───────────────────────────────────────────────────────
// Every option of a trial. Saved next to the checkpoints so the
// `evaluate` command can rebuild exactly the same model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub epoch:                 usize,
    pub batch_size:            usize,
    pub dataset:               String,
    pub num_iter_per_save:     u64,
    pub learning_rate:         f64,
    pub l2_reg:                f64,
    pub trial_id:              String,
    pub embedding_size:        usize,
    pub dropout_rate:          f64,
    pub regularization_weight: f64,
    pub random_seed:           u64,
    pub num_block:             usize,
    pub num_head:              usize,
    pub attention_size:        usize,
    pub scale_embedding:       bool,
    pub pool_filter_size:      usize,
    pub data_dir:              String,
    pub log_dir:               String,
    pub performance_dir:       String,
    pub validation_fraction:   f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            epoch:                 300,
            batch_size:            64,
            dataset:               "example".to_string(),
            num_iter_per_save:     100,
            learning_rate:         0.001,
            l2_reg:                0.01,
            trial_id:              "001".to_string(),
            embedding_size:        8,
            dropout_rate:          0.1,
            regularization_weight: 0.01,
            random_seed:           2018,
            num_block:             2,
            num_head:              8,
            attention_size:        128,
            scale_embedding:       true,
            pool_filter_size:      64,
            data_dir:              "data".to_string(),
            log_dir:               "logs".to_string(),
            performance_dir:       "performance".to_string(),
            validation_fraction:   0.1,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.epoch > 0, "epoch must be at least 1");
        anyhow::ensure!(self.batch_size > 0, "batch_size must be at least 1");
        anyhow::ensure!(self.num_iter_per_save > 0, "num_iter_per_save must be at least 1");
        anyhow::ensure!(self.num_block > 0, "num_block must be at least 1");
        anyhow::ensure!(self.num_head > 0, "num_head must be at least 1");
        anyhow::ensure!(
            self.attention_size % self.num_head == 0,
            "attention_size ({}) must be divisible by num_head ({})",
            self.attention_size, self.num_head
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.dropout_rate),
            "dropout_rate must be in [0, 1), got {}",
            self.dropout_rate
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.validation_fraction),
            "validation_fraction must be in [0, 1), got {}",
            self.validation_fraction
        );
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: RunConfig,
}

impl TrainUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<RunSummary> {
        let cfg = &self.config;

        // ── Step 1 ────────────────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: performance/, performance/ml/, logs/<dataset>/train_<id>/ ─
        let layout = RunLayout::from_config(cfg);
        layout.create_folder_tree()?;

        // ── Step 3: data ──────────────────────────────────────────────────────
        let mut loader = CtrDataLoader::from_dir(
            &cfg.data_dir,
            &cfg.dataset,
            cfg.batch_size,
            cfg.validation_fraction,
            cfg.random_seed,
        )?;
        tracing::info!(
            "Splits: {} train, {} validation, {} test rows",
            loader.train_len(),
            loader.split_len(EvalSplit::Validation),
            loader.split_len(EvalSplit::Test),
        );

        // ── Step 4: model sized from the data ─────────────────────────────────
        let device = Default::default();
        let mut session = build_session::<TrainBackend>(cfg, loader.feature_size(), &device);

        // ── Step 5: config snapshot for `evaluate` ────────────────────────────
        CheckpointManager::save_config(&layout, cfg)?;

        // ── Step 6 ────────────────────────────────────────────────────────────
        run_model(cfg, &layout, &mut loader, &mut session)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            RunConfig { epoch: 0, ..RunConfig::default() },
            RunConfig { batch_size: 0, ..RunConfig::default() },
            RunConfig { num_iter_per_save: 0, ..RunConfig::default() },
            RunConfig { num_head: 3, ..RunConfig::default() },
            RunConfig { dropout_rate: 1.0, ..RunConfig::default() },
            RunConfig { validation_fraction: -0.1, ..RunConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }

    #[test]
    fn test_config_json_round_trip() {
        let cfg = RunConfig { trial_id: "abc".into(), epoch: 7, ..RunConfig::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.trial_id, "abc");
        assert_eq!(back.epoch, 7);
    }
}
