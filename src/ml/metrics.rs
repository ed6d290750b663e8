// ============================================================
// Layer 5 — Metric Engine
// ============================================================
// Online metrics for a binary click-prediction model:
//
//   logloss_mean   — summed per-example log-loss / example count
//   auc            — area under the ROC curve
//   build_message  — the one-line performance record
//
// AUC is undefined when the labels contain only one class.
// That case is returned as a typed error, and each caller
// decides what it means:
//   - the per-batch training log maps it to 0.00 (auc_or_zero)
//   - the full evaluation pass propagates it as fatal
//
// AUC is computed through the Mann-Whitney U statistic:
//
//   AUC = (R+ - P(P+1)/2) / (P · N)
//
// where R+ is the sum of the ranks of the positive examples
// (tied scores share their average rank), P the number of
// positives and N the number of negatives.
//
// Reference: Fawcett (2006) An introduction to ROC analysis

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MetricError {
    #[error("AUC is undefined: only one class present ({positives} positive, {negatives} negative)")]
    SingleClass { positives: usize, negatives: usize },

    #[error("AUC is undefined on an empty set")]
    Empty,

    #[error("{labels} labels but {scores} scores")]
    LengthMismatch { labels: usize, scores: usize },
}

/// Mean log-loss over a whole pass.
///
/// Callers guarantee `count > 0`; an empty pass is not a supported input.
pub fn logloss_mean(sum: f64, count: usize) -> f64 {
    sum / count as f64
}

/// Area under the ROC curve for integer labels (0/1) and real scores.
pub fn auc(labels: &[u8], scores: &[f32]) -> Result<f64, MetricError> {
    if labels.len() != scores.len() {
        return Err(MetricError::LengthMismatch {
            labels: labels.len(),
            scores: scores.len(),
        });
    }
    if labels.is_empty() {
        return Err(MetricError::Empty);
    }

    let positives = labels.iter().filter(|&&y| y != 0).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(MetricError::SingleClass { positives, negatives });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Walk groups of tied scores, giving every member the group's mean rank.
    let mut positive_rank_sum = 0.0f64;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // ranks are 1-based: start+1 ..= end
        let mean_rank = (start + 1 + end) as f64 / 2.0;
        let tied_positives = order[start..end].iter().filter(|&&i| labels[i] != 0).count();
        positive_rank_sum += mean_rank * tied_positives as f64;
        start = end;
    }

    let p = positives as f64;
    let n = negatives as f64;
    Ok((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

/// Per-batch AUC for the training log: an undefined AUC becomes 0.00.
pub fn auc_or_zero(labels: &[u8], scores: &[f32]) -> f64 {
    match auc(labels, scores) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("batch AUC defaulted to 0.00: {e}");
            0.0
        }
    }
}

// ─── Performance messages ─────────────────────────────────────────────────────

/// Stage tag carried by every performance message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Train,
    Validation,
    Test,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Stage::Train      => "Trn",
            Stage::Validation => "Vld",
            Stage::Test       => "Tst",
        };
        f.write_str(tag)
    }
}

/// Epoch reported by evaluation passes that run outside the epoch loop.
pub const UNSET_EPOCH: usize = 999;

/// One performance record. Training records carry `iteration` and
/// `regloss`; evaluation records leave both out.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRecord {
    pub stage:       Stage,
    pub epoch:       usize,
    pub iteration:   Option<usize>,
    pub global_step: u64,
    pub logloss:     f64,
    pub regloss:     Option<f64>,
    pub auc:         f64,
}

impl PerformanceRecord {
    pub fn train(epoch: usize, iteration: usize, global_step: u64, logloss: f64, regloss: f64, auc: f64) -> Self {
        Self {
            stage: Stage::Train,
            epoch,
            iteration: Some(iteration),
            global_step,
            logloss,
            regloss: Some(regloss),
            auc,
        }
    }

    pub fn eval(validation: bool, epoch: Option<usize>, global_step: u64, logloss: f64, auc: f64) -> Self {
        Self {
            stage: if validation { Stage::Validation } else { Stage::Test },
            epoch: epoch.unwrap_or(UNSET_EPOCH),
            iteration: None,
            global_step,
            logloss,
            regloss: None,
            auc,
        }
    }
}

impl fmt::Display for PerformanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] Ep:{}", self.stage, self.epoch)?;
        if let Some(it) = self.iteration {
            write!(f, " It:{it}")?;
        }
        write!(f, " GS:{} LogLoss:{:.6}", self.global_step, self.logloss)?;
        if let Some(reg) = self.regloss {
            write!(f, " RegLoss:{reg:.6}")?;
        }
        write!(f, " AUC:{:.4}", self.auc)
    }
}

/// Format a performance message. Deterministic for identical inputs.
pub fn build_message(record: &PerformanceRecord) -> String {
    record.to_string()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_ranking() {
        let auc = auc(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert_eq!(auc, 1.0);
    }

    #[test]
    fn test_inverted_ranking() {
        let auc = auc(&[1, 1, 0, 0], &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert_eq!(auc, 0.0);
    }

    #[test]
    fn test_known_value() {
        // pairs (pos, neg): (0.35,0.1)+ (0.35,0.4)- (0.8,0.1)+ (0.8,0.4)+ → 3/4
        let auc = auc(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert!((auc - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_ties_count_half() {
        let auc = auc(&[0, 1, 0, 1], &[0.5, 0.5, 0.5, 0.5]).unwrap();
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_is_an_error() {
        let err = auc(&[1, 1, 1], &[0.2, 0.4, 0.9]).unwrap_err();
        assert_eq!(err, MetricError::SingleClass { positives: 3, negatives: 0 });
    }

    #[test]
    fn test_empty_and_mismatch() {
        assert_eq!(auc(&[], &[]).unwrap_err(), MetricError::Empty);
        assert!(matches!(
            auc(&[0, 1], &[0.3]),
            Err(MetricError::LengthMismatch { labels: 2, scores: 1 })
        ));
    }

    #[test]
    fn test_single_class_batch_defaults_to_zero() {
        assert_eq!(auc_or_zero(&[0, 0, 0, 0], &[0.1, 0.7, 0.3, 0.9]), 0.0);
        assert_eq!(auc_or_zero(&[0, 1], &[0.1, 0.9]), 1.0);
    }

    #[test]
    fn test_logloss_mean_divides_by_examples() {
        assert_eq!(logloss_mean(6.0, 4), 1.5);
    }

    #[test]
    fn test_train_message_has_iteration_and_regloss() {
        let msg = build_message(&PerformanceRecord::train(2, 17, 300, 0.5, 0.0125, 0.0));
        assert_eq!(msg, "[Trn] Ep:2 It:17 GS:300 LogLoss:0.500000 RegLoss:0.012500 AUC:0.0000");
    }

    #[test]
    fn test_eval_message_omits_training_fields() {
        let msg = build_message(&PerformanceRecord::eval(false, Some(0), 5, 0.693147, 0.71234));
        assert_eq!(msg, "[Tst] Ep:0 GS:5 LogLoss:0.693147 AUC:0.7123");

        let msg = build_message(&PerformanceRecord::eval(true, None, 5, 0.25, 0.5));
        assert_eq!(msg, "[Vld] Ep:999 GS:5 LogLoss:0.250000 AUC:0.5000");
    }
}
