// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores a saved checkpoint on the validation or test split.
//
//   Step 1: Read run_config.json of the trial   (Layer 6 - infra)
//   Step 2: Pick the checkpoint step            (Layer 6 - infra)
//   Step 3: Reload the splits                   (Layer 4 - data)
//   Step 4: Rebuild the session, load weights   (Layer 5 - ml)
//   Step 5: One evaluation pass                 (Layer 5 - ml)
//   Step 6: Append the message to the .pref     (Layer 6 - infra)
//
// Outside the training loop there is no epoch, so the message
// carries the sentinel epoch 999.

use anyhow::Result;

use crate::data::loader::CtrDataLoader;
use crate::domain::traits::BatchSource;
use crate::infra::{checkpoint::CheckpointManager, layout::RunLayout, performance::PerformanceLog};
use crate::ml::{
    evaluator::{run_evaluation, EvaluationReport},
    session::build_session,
    TrainBackend,
};

pub struct EvaluateUseCase {
    log_dir:    String,
    dataset:    String,
    trial_id:   String,
    validation: bool,
    step:       Option<u64>,
}

impl EvaluateUseCase {
    pub fn new(
        log_dir:    impl Into<String>,
        dataset:    impl Into<String>,
        trial_id:   impl Into<String>,
        validation: bool,
        step:       Option<u64>,
    ) -> Self {
        Self {
            log_dir:  log_dir.into(),
            dataset:  dataset.into(),
            trial_id: trial_id.into(),
            validation,
            step,
        }
    }

    pub fn execute(&self) -> Result<EvaluationReport> {
        // Only log_dir, dataset and trial id are needed to find the snapshot
        let probe = RunLayout::new("", &self.log_dir, &self.dataset, &self.trial_id);
        let cfg = CheckpointManager::load_config(&probe)?;
        let layout = RunLayout::new(&cfg.performance_dir, &self.log_dir, &cfg.dataset, &cfg.trial_id);

        let (step, stem) = CheckpointManager::resolve(&layout, self.step)?;

        let loader = CtrDataLoader::from_dir(
            &cfg.data_dir,
            &cfg.dataset,
            cfg.batch_size,
            cfg.validation_fraction,
            cfg.random_seed,
        )?;
        let device = Default::default();
        let session = build_session::<TrainBackend>(&cfg, loader.feature_size(), &device)
            .restore(&stem, step)?;

        let report = run_evaluation(&loader, &session, self.validation, None)?;

        println!("{}", report.message);
        PerformanceLog::append(layout.performance_file())?.write_line(&report.message)?;
        Ok(report)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{RunConfig, TrainUseCase};
    use crate::ml::fixtures::ScriptedModel;
    use std::fs;

    fn write_toy_dataset(root: &std::path::Path) {
        let dir = root.join("toy");
        fs::create_dir_all(&dir).unwrap();
        let rows = |n: usize, offset: usize| -> String {
            (0..n)
                .map(|i| {
                    let y = i % 2;
                    format!("{} {} {} {}\n", y, (i + offset) % 6, 6 + y, 8 + (i % 3))
                })
                .collect()
        };
        fs::write(dir.join("train.txt"), rows(24, 0)).unwrap();
        fs::write(dir.join("valid.txt"), rows(8, 1)).unwrap();
        fs::write(dir.join("test.txt"), rows(8, 2)).unwrap();
    }

    #[test]
    fn test_train_then_evaluate_latest_checkpoint() {
        let tmp = tempfile::tempdir().unwrap();
        write_toy_dataset(tmp.path());

        let cfg = RunConfig {
            epoch:             2,
            batch_size:        8,
            dataset:           "toy".into(),
            trial_id:          "e2e".into(),
            num_iter_per_save: 3,
            embedding_size:    4,
            num_block:         1,
            num_head:          2,
            attention_size:    8,
            pool_filter_size:  4,
            dropout_rate:      0.0,
            data_dir:          tmp.path().display().to_string(),
            log_dir:           tmp.path().join("logs").display().to_string(),
            performance_dir:   tmp.path().join("perf").display().to_string(),
            ..RunConfig::default()
        };

        // 24 rows / 8 per batch = 3 steps per epoch, checkpoints at 3 and 6
        let summary = TrainUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(summary.epoch_end_steps, vec![3, 6]);
        assert_eq!(summary.checkpoint_steps, vec![3, 6]);

        let report = EvaluateUseCase::new(&cfg.log_dir, "toy", "e2e", true, None)
            .execute()
            .unwrap();
        assert!(report.message.starts_with("[Vld] Ep:999 GS:6 "));
        assert_eq!(report.examples, 8);

        let older = EvaluateUseCase::new(&cfg.log_dir, "toy", "e2e", false, Some(3))
            .execute()
            .unwrap();
        assert!(older.message.starts_with("[Tst] Ep:999 GS:3 "));

        let pref = fs::read_to_string(tmp.path().join("perf").join("toy.e2e.pref")).unwrap();
        let last: Vec<&str> = pref.lines().rev().take(2).collect();
        assert!(last[0].starts_with("[Tst] Ep:999 GS:3 "));
        assert!(last[1].starts_with("[Vld] Ep:999 GS:6 "));
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let logs = tmp.path().join("logs");
        let cfg = RunConfig {
            dataset:         "toy".into(),
            trial_id:        "x".into(),
            log_dir:         logs.display().to_string(),
            performance_dir: tmp.path().join("perf").display().to_string(),
            ..RunConfig::default()
        };
        let layout = RunLayout::from_config(&cfg);
        layout.create_folder_tree().unwrap();
        CheckpointManager::save_config(&layout, &cfg).unwrap();
        CheckpointManager::new(layout)
            .save(&ScriptedModel { step: 2, ..Default::default() }, 2)
            .unwrap();

        let err = EvaluateUseCase::new(&cfg.log_dir, "toy", "x", true, Some(5))
            .execute()
            .unwrap_err();
        assert!(err.to_string().contains("No retained checkpoint for step 5"), "{err}");
    }
}
