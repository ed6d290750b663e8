// ============================================================
// Layer 5 — Training Orchestrator
// ============================================================
// Drives the epoch loop:
//
//   for epoch in 0..epochs
//     rewind the training split
//     for each training batch
//       train step              (model mutates, step += 1)
//       every 100 steps         → performance log (+ console every 1000)
//       every num_iter_per_save → checkpoint
//       every batch             → telemetry summary
//     test pass under the current parameters
//     last epoch only           → attention CSV export
//     test message              → console + performance log
//
// The global step is read once per batch, from the train step's
// own output, and that snapshot drives every cadence decision
// for the batch.
//
// There is no early stopping: all configured epochs run.
// A per-batch AUC that is undefined is logged as 0.00; any other
// failure (model, I/O, test-set AUC) aborts the run. The
// performance log and event stream are closed by Drop on both
// the normal and the error path.

use anyhow::Result;

use crate::application::train_use_case::RunConfig;
use crate::domain::traits::{BatchSource, CtrModel};
use crate::infra::{
    checkpoint::CheckpointManager,
    export::write_attention_csv,
    layout::RunLayout,
    performance::PerformanceLog,
    telemetry::TelemetryWriter,
};
use crate::ml::evaluator::{run_evaluation, EvaluationReport};
use crate::ml::metrics::{auc_or_zero, build_message, PerformanceRecord};

/// Steps between performance-log lines.
pub const LOG_EVERY: u64 = 100;

/// Steps between performance lines mirrored to the console.
pub const CONSOLE_EVERY: u64 = 1000;

/// What a finished run hands back to the caller.
#[derive(Debug)]
pub struct RunSummary {
    /// Global step at the end of each epoch
    pub epoch_end_steps: Vec<u64>,
    /// Steps at which a checkpoint was written
    pub checkpoint_steps: Vec<u64>,
    /// Test-pass report of the final epoch
    pub last_test: Option<EvaluationReport>,
}

pub fn run_model<S, M>(
    cfg:    &RunConfig,
    layout: &RunLayout,
    source: &mut S,
    model:  &mut M,
) -> Result<RunSummary>
where
    S: BatchSource,
    M: CtrModel,
{
    println!("\n========\nID:{}\n========\n", cfg.trial_id);

    let mut performance = PerformanceLog::create(layout.performance_file())?;
    let mut telemetry   = TelemetryWriter::create(layout.events_file())?;
    let mut checkpoints = CheckpointManager::new(layout.clone());
    tracing::info!(
        "Training {} epochs on {} fields / {} features",
        cfg.epoch, source.field_size(), source.feature_size()
    );

    let mut summary = RunSummary {
        epoch_end_steps:  Vec::with_capacity(cfg.epoch),
        checkpoint_steps: Vec::new(),
        last_test:        None,
    };

    for epoch in 0..cfg.epoch {
        source.start_epoch();

        while source.has_next() {
            let Some(batch) = source.next_train_batch() else { break };
            let out  = model.train_step(&batch)?;
            let step = out.global_step;

            if step % LOG_EVERY == 0 {
                let auc = auc_or_zero(&batch.int_labels(), &out.sigmoid);
                let msg = build_message(&PerformanceRecord::train(
                    epoch,
                    source.batch_index(),
                    step,
                    out.mean_logloss,
                    out.reg_loss,
                    auc,
                ));
                performance.write_line(&msg)?;

                if step % CONSOLE_EVERY == 0 {
                    println!("{msg}");
                }
            }

            if step % cfg.num_iter_per_save == 0 {
                println!("\tSaving Checkpoint at global step [{step}]!");
                checkpoints.save(&*model, step)?;
                summary.checkpoint_steps.push(step);
            }

            telemetry.add_summary(&out.summary)?;
        }
        telemetry.flush()?;

        let step = model.global_step();
        summary.epoch_end_steps.push(step);
        tracing::info!("Epoch {} done at global step {}", epoch, step);

        let report = run_evaluation(&*source, &*model, false, Some(epoch))?;
        tracing::info!(
            "Test pass: {} examples in {} batches, logloss={:.6}, auc={:.4}",
            report.examples, report.batches, report.mean_logloss, report.auc
        );

        if epoch + 1 == cfg.epoch {
            for (i, map) in report.attention.iter().enumerate() {
                write_attention_csv(layout.attention_file(epoch, i + 1), map)?;
            }
            tracing::info!("Exported attention maps for epoch {}", epoch);
        }

        println!("{}", report.message);
        performance.write_line(&report.message)?;
        summary.last_test = Some(report);
    }

    println!("Training finished!");
    Ok(summary)
}
