// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `evaluate`, and all
// their flags. Defaults mirror RunConfig::default().
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use crate::application::train_use_case::RunConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the attention model and test it after every epoch
    Train(TrainArgs),

    /// Score a saved checkpoint on the validation or test split
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Number of full passes over the training split
    #[arg(long, default_value_t = 300)]
    pub epoch: usize,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Dataset name, a directory under --data-dir
    #[arg(long, default_value = "example")]
    pub dataset: String,

    /// Save a checkpoint whenever the global step is a multiple of this
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    pub num_iter_per_save: u64,

    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f64,

    /// Adam weight decay
    #[arg(long, default_value_t = 0.01)]
    pub l2_reg: f64,

    /// Names every artifact of the run
    #[arg(long, default_value = "001")]
    pub trial_id: String,

    #[arg(long, default_value_t = 8)]
    pub embedding_size: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout_rate: f64,

    /// Weight of the L2 penalty on the embedding table
    #[arg(long, default_value_t = 0.01)]
    pub regularization_weight: f64,

    #[arg(long, default_value_t = 2018)]
    pub random_seed: u64,

    /// Stacked self-attention blocks
    #[arg(long, default_value_t = 2)]
    pub num_block: usize,

    /// Heads per block; must divide --attention-size
    #[arg(long, default_value_t = 8)]
    pub num_head: usize,

    #[arg(long, default_value_t = 128)]
    pub attention_size: usize,

    /// Multiply embeddings by sqrt(embedding_size)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub scale_embedding: bool,

    /// Hidden width of the attention pooling layer
    #[arg(long, default_value_t = 64)]
    pub pool_filter_size: usize,

    #[arg(long, default_value = "data")]
    pub data_dir: String,

    #[arg(long, default_value = "logs")]
    pub log_dir: String,

    #[arg(long, default_value = "performance")]
    pub performance_dir: String,

    /// Share of training rows held out when the dataset has no valid.txt
    #[arg(long, default_value_t = 0.1)]
    pub validation_fraction: f64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for RunConfig {
    fn from(a: TrainArgs) -> Self {
        RunConfig {
            epoch:                 a.epoch,
            batch_size:            a.batch_size,
            dataset:               a.dataset,
            num_iter_per_save:     a.num_iter_per_save,
            learning_rate:         a.learning_rate,
            l2_reg:                a.l2_reg,
            trial_id:              a.trial_id,
            embedding_size:        a.embedding_size,
            dropout_rate:          a.dropout_rate,
            regularization_weight: a.regularization_weight,
            random_seed:           a.random_seed,
            num_block:             a.num_block,
            num_head:              a.num_head,
            attention_size:        a.attention_size,
            scale_embedding:       a.scale_embedding,
            pool_filter_size:      a.pool_filter_size,
            data_dir:              a.data_dir,
            log_dir:               a.log_dir,
            performance_dir:       a.performance_dir,
            validation_fraction:   a.validation_fraction,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitArg {
    Vld,
    Tst,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long, default_value = "example")]
    pub dataset: String,

    #[arg(long, default_value = "001")]
    pub trial_id: String,

    #[arg(long, value_enum)]
    pub split: SplitArg,

    /// Checkpoint step to load; the latest one when omitted
    #[arg(long)]
    pub step: Option<u64>,

    /// Log root the trial was trained with
    #[arg(long, default_value = "logs")]
    pub log_dir: String,
}
