// ============================================================
// Layer 5 — Evaluation Runner
// ============================================================
// Drains one held-out split (validation or test) exactly once
// under the current parameters and turns the per-batch outputs
// into dataset-level results:
//
//   mean_logloss = Σ per-example log-loss / number of examples
//   auc          = AUC over every score of the pass, in order
//   attn_*       = per-batch attention maps stacked row-wise,
//                  leaving out the last batch of the pass
//
// The metrics include the final batch; the attention maps do
// not. The final batch may be partial, and only the exported
// maps drop it.
//
// Unlike the per-batch training log, an undefined AUC here is
// an error: a split whose labels are all one class means the
// data is misconfigured.

use anyhow::{Context, Result};

use crate::domain::attention::AttentionMap;
use crate::domain::batch::EvalSplit;
use crate::domain::traits::{BatchSource, CtrModel};
use crate::ml::metrics::{auc, build_message, logloss_mean, PerformanceRecord};

/// Per-pass accumulator, filled in batch-arrival order.
#[derive(Debug, Default)]
struct EpochAccumulator {
    sigmoid:     Vec<f32>,
    labels:      Vec<u8>,
    logloss_sum: f64,
    attention:   [Vec<AttentionMap>; 4],
}

/// Result of one evaluation pass.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub message:      String,
    pub mean_logloss: f64,
    pub auc:          f64,
    pub examples:     usize,
    pub batches:      usize,
    /// attn_1, attn_2, attn_3, attn_k
    pub attention:    [AttentionMap; 4],
}

/// Run the model in inference mode over a fresh pass of the chosen split.
///
/// `epoch` is `None` when called outside the training loop; the message
/// then carries the sentinel epoch.
pub fn run_evaluation<S, M>(
    source:     &S,
    model:      &M,
    validation: bool,
    epoch:      Option<usize>,
) -> Result<EvaluationReport>
where
    S: BatchSource + ?Sized,
    M: CtrModel + ?Sized,
{
    let split = EvalSplit::from_validation_flag(validation);
    let mut acc = EpochAccumulator::default();
    let mut batches = 0usize;

    for batch in source.eval_batches(split) {
        let out = model.eval_step(&batch)?;

        acc.sigmoid.extend_from_slice(&out.sigmoid);
        acc.labels.extend(batch.int_labels());
        acc.logloss_sum += out.logloss.iter().map(|&l| l as f64).sum::<f64>();
        for (list, map) in acc.attention.iter_mut().zip(out.attention) {
            list.push(map);
        }
        batches += 1;
    }

    let examples = acc.sigmoid.len();
    let mean_logloss = logloss_mean(acc.logloss_sum, examples);
    let auc = auc(&acc.labels, &acc.sigmoid)
        .with_context(|| format!("{split:?} AUC over {examples} examples in {batches} batches"))?;

    let record = PerformanceRecord::eval(validation, epoch, model.global_step(), mean_logloss, auc);
    let attention = acc.attention.map(|maps| AttentionMap::concat_all_but_last(&maps));

    tracing::debug!("{:?} pass: {} batches, {} examples", split, batches, examples);

    Ok(EvaluationReport {
        message: build_message(&record),
        mean_logloss,
        auc,
        examples,
        batches,
        attention,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch::Batch;
    use crate::ml::fixtures::{ScriptedModel, VecSource};
    use crate::ml::metrics;

    fn batch(ids: &[u32], labels: &[f32]) -> Batch {
        Batch::new(ids.to_vec(), labels.to_vec(), 1)
    }

    fn ragged_source() -> VecSource {
        // Three batches, the last one partial.
        VecSource::uniform(1, 1000, 2, 0, 0).with_test(vec![
            batch(&[100, 900], &[0.0, 1.0]),
            batch(&[300, 200], &[1.0, 0.0]),
            batch(&[500], &[1.0]),
        ])
    }

    #[test]
    fn test_metrics_cover_every_batch() {
        let source = ragged_source();
        let model = ScriptedModel { step: 42, ..Default::default() };
        let report = run_evaluation(&source, &model, false, Some(3)).unwrap();

        assert_eq!(report.batches, 3);
        assert_eq!(report.examples, 5);

        // Σ logloss = (100+900+300+200+500)/100 = 20 over 5 examples
        assert!((report.mean_logloss - 4.0).abs() < 1e-6);

        let expected = metrics::auc(&[0, 1, 1, 0, 1], &[0.1, 0.9, 0.3, 0.2, 0.5]).unwrap();
        assert_eq!(report.auc, expected);
        assert_eq!(report.message, format!("[Tst] Ep:3 GS:42 LogLoss:4.000000 AUC:{:.4}", expected));
    }

    #[test]
    fn test_attention_excludes_last_batch() {
        let source = ragged_source();
        let report = run_evaluation(&source, &ScriptedModel::default(), false, None).unwrap();

        for (j, map) in report.attention.iter().enumerate() {
            let j = j as f32;
            assert_eq!(map.rows(), 4);
            assert_eq!(map.values, vec![100.0 + j, 900.0 + j, 300.0 + j, 200.0 + j]);
        }
    }

    #[test]
    fn test_validation_flag_selects_split_and_stage() {
        let mut source = ragged_source();
        source.valid = vec![batch(&[10, 20], &[0.0, 1.0]), batch(&[30, 40], &[1.0, 0.0])];
        let report = run_evaluation(&source, &ScriptedModel::default(), true, None).unwrap();
        assert_eq!(report.examples, 4);
        assert!(report.message.starts_with("[Vld] Ep:999 GS:0 "));
    }

    #[test]
    fn test_single_class_split_is_fatal() {
        let source = VecSource::uniform(1, 1000, 2, 0, 0)
            .with_test(vec![batch(&[1, 2], &[1.0, 1.0]), batch(&[3], &[1.0])]);
        let err = run_evaluation(&source, &ScriptedModel::default(), false, Some(0)).unwrap_err();
        assert!(err.root_cause().to_string().contains("only one class"));
    }

    #[test]
    fn test_evaluation_does_not_advance_step() {
        let source = ragged_source();
        let model = ScriptedModel { step: 7, ..Default::default() };
        run_evaluation(&source, &model, false, Some(0)).unwrap();
        assert_eq!(model.global_step(), 7);
    }
}
