// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Two halves:
//
//   backend-free, driven through the domain seam traits
//     metrics.rs    — log-loss, AUC, performance messages
//     evaluator.rs  — one evaluation pass over vld or tst
//     trainer.rs    — the epoch/batch loop and its side effects
//
//   Burn specific
//     model.rs      — attention feature-interaction network
//     session.rs    — parameters + Adam + global step, the
//                     CtrModel the trainer drives
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Log-loss, AUC and message formatting
pub mod metrics;

/// Attention feature-interaction network
pub mod model;

/// Stateful model session implementing CtrModel
pub mod session;

/// Epoch loop with logging, checkpointing and export
pub mod trainer;

/// Evaluation pass over the validation or test split
pub mod evaluator;

#[cfg(test)]
pub mod fixtures;

#[cfg(not(feature = "wgpu"))]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray<f32>>;

#[cfg(feature = "wgpu")]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
