// ============================================================
// Layer 5 — Model Session
// ============================================================
// The stateful side of the model. A session owns:
//   - the learnable parameters (CtrAttentionModel on an
//     autodiff backend)
//   - the Adam optimiser state
//   - the global step counter
//
// and implements the CtrModel seam the orchestrator drives.
//
// train_step: forward → loss → backward → Adam update, step += 1
// eval_step:  model.valid() drops to the inner backend, so no
//             graph is recorded and dropout is inactive; &self
//             guarantees the parameters are only read.
//
// Key Burn insight (same as for any AutodiffModule):
//   optim.step consumes the module and returns the updated one,
//   so the session swaps its model on every update.
//
// Reference: Burn Book §5 (Training), Kingma & Ba (2015) Adam

use anyhow::{Context, Result};
use burn::{
    module::AutodiffModule,
    optim::{decay::WeightDecayConfig, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    record::{CompactRecorder, FileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use std::path::{Path, PathBuf};

use crate::application::train_use_case::RunConfig;
use crate::data::batcher::CtrBatcher;
use crate::domain::attention::AttentionMap;
use crate::domain::batch::Batch;
use crate::domain::traits::{CtrModel, EvalOutput, StepSummary, TrainOutput};
use crate::ml::model::{binary_logloss, CtrAttentionConfig, CtrAttentionModel};

pub struct ModelSession<B: AutodiffBackend, O> {
    model:                 CtrAttentionModel<B>,
    optim:                 O,
    learning_rate:         f64,
    regularization_weight: f64,
    global_step:           u64,
    device:                B::Device,
}

/// Model hyper-parameters from the run configuration and the data shape.
pub fn model_config(cfg: &RunConfig, feature_size: usize) -> CtrAttentionConfig {
    CtrAttentionConfig::new(feature_size)
        .with_embedding_size(cfg.embedding_size)
        .with_num_block(cfg.num_block)
        .with_num_head(cfg.num_head)
        .with_attention_size(cfg.attention_size)
        .with_pool_filter_size(cfg.pool_filter_size)
        .with_dropout_rate(cfg.dropout_rate)
        .with_scale_embedding(cfg.scale_embedding)
}

/// Build a freshly initialised session (step 0) with an Adam optimiser.
pub fn build_session<B: AutodiffBackend>(
    cfg:          &RunConfig,
    feature_size: usize,
    device:       &B::Device,
) -> ModelSession<B, impl Optimizer<CtrAttentionModel<B>, B>> {
    B::seed(device, cfg.random_seed);

    let model: CtrAttentionModel<B> = model_config(cfg, feature_size).init(device);

    let weight_decay = (cfg.l2_reg > 0.0).then(|| WeightDecayConfig::new(cfg.l2_reg as f32));
    let optim = AdamConfig::new()
        .with_epsilon(1e-8)
        .with_weight_decay(weight_decay)
        .init::<B, CtrAttentionModel<B>>();

    tracing::info!(
        "Model ready: {} blocks, {} heads, attention_size={}, feature_size={}",
        cfg.num_block, cfg.num_head, cfg.attention_size, feature_size
    );

    ModelSession {
        model,
        optim,
        learning_rate:         cfg.learning_rate,
        regularization_weight: cfg.regularization_weight,
        global_step:           0,
        device:                device.clone(),
    }
}

impl<B, O> ModelSession<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<CtrAttentionModel<B>, B>,
{
    /// Load parameters written by `save_checkpoint` and resume the step counter.
    pub fn restore(mut self, stem: &Path, global_step: u64) -> Result<Self> {
        let record = CompactRecorder::new()
            .load(stem.to_path_buf(), &self.device)
            .with_context(|| format!("Cannot load checkpoint '{}'", stem.display()))?;
        self.model = self.model.load_record(record);
        self.global_step = global_step;
        tracing::info!("Restored checkpoint '{}' at step {}", stem.display(), global_step);
        Ok(self)
    }
}

fn scalar<B: Backend>(t: Tensor<B, 1>) -> f64 {
    t.into_scalar().elem::<f64>()
}

fn floats<B: Backend, const D: usize>(t: Tensor<B, D>) -> Result<Vec<f32>> {
    t.into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read tensor back: {e:?}"))
}

fn attention_map<B: Backend>(t: Tensor<B, 2>) -> Result<AttentionMap> {
    let cols = t.dims()[1];
    Ok(AttentionMap::new(cols, floats(t)?))
}

impl<B, O> CtrModel for ModelSession<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<CtrAttentionModel<B>, B>,
{
    fn train_step(&mut self, batch: &Batch) -> Result<TrainOutput> {
        let tensors = CtrBatcher::<B>::new(self.device.clone()).batch(batch);
        let loss = self
            .model
            .forward_loss(tensors.indices, tensors.labels, self.regularization_weight);

        let overall_loss = scalar(loss.overall.clone());
        let mean_logloss = scalar(loss.mean_logloss);
        let reg_loss     = scalar(loss.reg_loss);
        let sigmoid      = floats(loss.probs)?;

        let grads = loss.overall.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self.optim.step(self.learning_rate, self.model.clone(), grads);
        self.global_step += 1;

        Ok(TrainOutput {
            global_step: self.global_step,
            summary: StepSummary {
                global_step: self.global_step,
                overall_loss,
                mean_logloss,
                reg_loss,
            },
            reg_loss,
            mean_logloss,
            sigmoid,
        })
    }

    fn eval_step(&self, batch: &Batch) -> Result<EvalOutput> {
        let model = self.model.valid();
        let tensors = CtrBatcher::<B::InnerBackend>::new(self.device.clone()).batch(batch);

        let out = model.forward(tensors.indices);
        let logloss = binary_logloss(out.logits.clone(), tensors.labels);
        let probs = burn::tensor::activation::sigmoid(out.logits);
        let [a1, a2, a3, ak] = out.attention;

        Ok(EvalOutput {
            sigmoid:   floats(probs)?,
            logloss:   floats(logloss)?,
            attention: [
                attention_map(a1)?,
                attention_map(a2)?,
                attention_map(a3)?,
                attention_map(ak)?,
            ],
        })
    }

    fn global_step(&self) -> u64 {
        self.global_step
    }

    fn save_checkpoint(&self, stem: &Path) -> Result<PathBuf> {
        CompactRecorder::new()
            .record(self.model.clone().into_record(), stem.to_path_buf())
            .with_context(|| format!("Failed to save checkpoint to '{}'", stem.display()))?;
        Ok(stem.with_extension(<CompactRecorder as FileRecorder<B>>::file_extension()))
    }
}
