use crate::model::ScoredRecord;
use rand::{SeedableRng, seq::SliceRandom};
use rand_pcg::Pcg64Mcg;
use tracing::{info, warn};

/// Reason text for a record the rate controller upgraded to fraudulent.
pub const REASON_RELABELED_FRAUD: &str = "Relabeled fraudulent by rate control";
/// Reason text for a record the rate controller downgraded.
pub const REASON_RELABELED_CLEAR: &str = "Cleared by rate control";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceReport {
    pub total: usize,
    pub target: usize,
    pub fraud_before: usize,
    pub fraud_after: usize,
    pub upgraded: usize,
    pub downgraded: usize,
    pub clamped: bool,
}

/// Resamples the fraud labels of a scored batch so the realized fraud
/// fraction matches the configured target. Selection is uniform without
/// replacement and fully determined by the seed and the input order.
///
/// Flipped records are never left with a stale reason: the label, the reason
/// text and the `relabeled` marker change together. The per-rule audit hits
/// stay untouched, they record what the rules actually said.
pub struct Rebalancer {
    target_fraction: f64,
    seed: u64,
}

impl Rebalancer {
    pub fn new(target_fraction: f64, seed: u64) -> Self {
        Self {
            target_fraction,
            seed,
        }
    }

    pub fn rebalance<P>(&self, scored: &mut [ScoredRecord<P>]) -> RebalanceReport {
        let total = scored.len();
        let fraud_before = scored.iter().filter(|s| s.fraud_indicator).count();

        if total == 0 {
            info!("empty batch, rate control is a no-op");
            return RebalanceReport {
                total,
                target: 0,
                fraud_before,
                fraud_after: fraud_before,
                upgraded: 0,
                downgraded: 0,
                clamped: false,
            };
        }

        let raw_target = (self.target_fraction * total as f64).round() as usize;
        let clamped = raw_target > total;
        let target = raw_target.min(total);
        if clamped {
            warn!(raw_target, total, "target fraud count exceeds batch size, clamping");
        }

        let mut upgraded = 0;
        let mut downgraded = 0;

        if fraud_before > target {
            downgraded = fraud_before - target;
            let candidates: Vec<usize> = indices_where(scored, true);
            for index in self.pick(candidates, downgraded) {
                let record = &mut scored[index];
                record.fraud_indicator = false;
                record.fraud_reason = REASON_RELABELED_CLEAR.to_string();
                record.relabeled = true;
            }
        } else if fraud_before < target {
            upgraded = target - fraud_before;
            let candidates: Vec<usize> = indices_where(scored, false);
            for index in self.pick(candidates, upgraded) {
                let record = &mut scored[index];
                record.fraud_indicator = true;
                record.fraud_reason = REASON_RELABELED_FRAUD.to_string();
                record.relabeled = true;
            }
        }

        let fraud_after = scored.iter().filter(|s| s.fraud_indicator).count();
        info!(
            total,
            target, fraud_before, fraud_after, upgraded, downgraded, "rate control finished"
        );

        RebalanceReport {
            total,
            target,
            fraud_before,
            fraud_after,
            upgraded,
            downgraded,
            clamped,
        }
    }

    /// Uniform sample of `count` indices without replacement.
    fn pick(&self, mut candidates: Vec<usize>, count: usize) -> Vec<usize> {
        let mut rng = Pcg64Mcg::seed_from_u64(self.seed);
        let (chosen, _) = candidates.partial_shuffle(&mut rng, count);
        chosen.to_vec()
    }
}

fn indices_where<P>(scored: &[ScoredRecord<P>], fraud: bool) -> Vec<usize> {
    scored
        .iter()
        .enumerate()
        .filter(|(_, s)| s.fraud_indicator == fraud)
        .map(|(index, _)| index)
        .collect()
}
