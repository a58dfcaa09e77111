use crate::{
    error::PipelineError,
    expression::ExpressionRules,
    model::{Scorable, ScoredRecord},
    rules::RuleSet,
    verdict,
};
use common::config::{AggregationMode, ScoringConfig};
use std::collections::HashSet;
use tracing::{debug, info};

/// Scores a whole in-memory batch in one pass: extract features, evaluate
/// the rule registry, fold the outcomes into a verdict. Rebalancing is a
/// separate, explicit stage (`crate::rebalance`) so what the rules say stays
/// separable from what the training-set balance requires.
pub struct BatchProcessor {
    rules: RuleSet,
    expressions: ExpressionRules,
    mode: AggregationMode,
    threshold: usize,
}

impl BatchProcessor {
    /// Fails fast when a rule (built-in or expression) references a feature
    /// the extractor can never emit.
    pub fn new(
        rules: RuleSet,
        expressions: ExpressionRules,
        scoring: &ScoringConfig,
        known_features: &HashSet<String>,
    ) -> Result<Self, PipelineError> {
        rules.validate(known_features)?;
        expressions.validate(known_features)?;

        info!(
            rules = rules.len(),
            expressions = expressions.len(),
            mode = ?scoring.mode,
            "initialized batch processor"
        );

        Ok(Self {
            rules,
            expressions,
            mode: scoring.mode,
            threshold: scoring.threshold,
        })
    }

    pub fn score_batch<P: Scorable>(
        &self,
        records: Vec<P>,
        context: &P::Context,
    ) -> Vec<ScoredRecord<P>> {
        let total = records.len();
        let scored: Vec<ScoredRecord<P>> = records
            .into_iter()
            .map(|record| self.score_one(record, context))
            .collect();

        let flagged = scored.iter().filter(|s| s.fraud_indicator).count();
        info!(total, flagged, "scored batch");
        scored
    }

    fn score_one<P: Scorable>(&self, record: P, context: &P::Context) -> ScoredRecord<P> {
        let features = record.extract_features(context);
        let mut hits = self.rules.evaluate(&features);
        hits.extend(self.expressions.evaluate(&features));

        let (fraud_indicator, fraud_reason) = verdict::combine(&hits, self.mode, self.threshold);
        debug!(record = record.id(), fraud_indicator, "scored record");

        ScoredRecord {
            record,
            hits,
            fraud_indicator,
            fraud_reason,
            relabeled: false,
        }
    }
}
