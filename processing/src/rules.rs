use crate::{
    error::PipelineError,
    model::{Feature, RuleHit},
};
use std::collections::HashSet;

type Predicate = Box<dyn Fn(&[Feature]) -> bool + Send + Sync>;

/// A named boolean test over one record's features. Predicates must be pure
/// and total: a missing or unexpected feature value means "does not fire",
/// never a panic or an error.
pub struct Rule {
    name: String,
    required: Vec<String>,
    predicate: Predicate,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish()
    }
}

/// Ordered registry of rules. The registry order is the canonical order of
/// audit columns and of names in the reason string.
#[derive(Default, Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(
        &mut self,
        name: &str,
        required: &[&str],
        predicate: impl Fn(&[Feature]) -> bool + Send + Sync + 'static,
    ) {
        self.rules.push(Rule {
            name: name.to_string(),
            required: required.iter().map(|f| f.to_string()).collect(),
            predicate: Box::new(predicate),
        });
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Drop rules whose name the predicate rejects, preserving order.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.rules.retain(|rule| keep(&rule.name));
    }

    /// Schema check, run once before a batch: every feature a rule declares
    /// must be one the extractor can emit. A record-level absence is fine; a
    /// name that can never exist is a configuration error.
    pub fn validate(&self, known_features: &HashSet<String>) -> Result<(), PipelineError> {
        for rule in &self.rules {
            for feature in &rule.required {
                if !known_features.contains(feature) {
                    return Err(PipelineError::UnknownFeature {
                        rule: rule.name.clone(),
                        feature: feature.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn evaluate(&self, features: &[Feature]) -> Vec<RuleHit> {
        self.rules
            .iter()
            .map(|rule| RuleHit {
                rule: rule.name.clone(),
                triggered: (rule.predicate)(features),
            })
            .collect()
    }
}
