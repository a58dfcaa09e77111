use crate::model::RuleHit;
use common::config::AggregationMode;

/// Reason text when no rule fired.
pub const REASON_NONE: &str = "No indicators triggered";

/// Fold per-rule outcomes into the fraud indicator and the reason string.
/// The reason always lists exactly the triggered rule names, in registry
/// order, regardless of whether the indicator ends up set.
pub fn combine(hits: &[RuleHit], mode: AggregationMode, threshold: usize) -> (bool, String) {
    let triggered: Vec<&str> = hits
        .iter()
        .filter(|hit| hit.triggered)
        .map(|hit| hit.rule.as_str())
        .collect();

    let fraud = match mode {
        AggregationMode::AnyTrigger => !triggered.is_empty(),
        AggregationMode::CountThreshold => triggered.len() >= threshold,
    };

    let reason = if triggered.is_empty() {
        REASON_NONE.to_string()
    } else {
        triggered.join(", ")
    };

    (fraud, reason)
}
