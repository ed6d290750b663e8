// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All work is delegated to Layer 2 (application).
//
//   1. `train`    — run a full trial
//   2. `evaluate` — score a saved checkpoint on vld or tst
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, SplitArg, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "ctr-attention",
    version = "0.1.0",
    about = "Train and evaluate an attention-based click-through-rate model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting trial '{}' on dataset '{}'", args.trial_id, args.dataset);

    let summary = TrainUseCase::new(args.into()).execute()?;
    tracing::info!(
        "Trial finished at global step {} with {} checkpoint(s) written",
        summary.epoch_end_steps.last().copied().unwrap_or(0),
        summary.checkpoint_steps.len()
    );
    if let Some(report) = &summary.last_test {
        tracing::info!("Final test AUC {:.4}", report.auc);
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let use_case = EvaluateUseCase::new(
        args.log_dir,
        args.dataset,
        args.trial_id,
        args.split == SplitArg::Vld,
        args.step,
    );
    use_case.execute()?;
    Ok(())
}
