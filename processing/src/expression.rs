use crate::{
    error::PipelineError,
    model::{Feature, RuleHit},
};
use common::config::CustomRule;
use evalexpr::{ContextWithMutableVariables, DefaultNumericTypes, HashMapContext, Node, Value};
use std::collections::HashSet;
use tracing::warn;

/// Config-supplied rules written as expressions over the feature context,
/// e.g. `claim_amount > 2.0 * policy_premium`. Syntax errors are fatal at
/// compile time; evaluation errors (typically a feature absent from this
/// record) resolve to not-triggered.
#[derive(Debug)]
pub struct ExpressionRules {
    rules: Vec<(String, Node<DefaultNumericTypes>)>,
}

impl ExpressionRules {
    pub fn compile(custom: &[CustomRule]) -> Result<Self, PipelineError> {
        let mut rules = Vec::with_capacity(custom.len());
        for rule in custom {
            let node = evalexpr::build_operator_tree::<DefaultNumericTypes>(&rule.expression)
                .map_err(|e| PipelineError::InvalidExpression {
                    name: rule.name.clone(),
                    message: e.to_string(),
                })?;
            rules.push((rule.name.clone(), node));
        }

        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Every variable an expression mentions must be a feature the extractor
    /// can emit, checked once before the batch like the built-in rules.
    pub fn validate(&self, known_features: &HashSet<String>) -> Result<(), PipelineError> {
        for (name, node) in &self.rules {
            for identifier in node.iter_variable_identifiers() {
                if !known_features.contains(identifier) {
                    return Err(PipelineError::UnknownFeature {
                        rule: name.clone(),
                        feature: identifier.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn evaluate(&self, features: &[Feature]) -> Vec<RuleHit> {
        if self.rules.is_empty() {
            return Vec::new();
        }

        let context = Self::build_context(features);
        self.rules
            .iter()
            .map(|(name, node)| {
                let triggered = match node.eval_with_context(&context) {
                    Ok(Value::Boolean(value)) => value,
                    Ok(other) => {
                        warn!(rule = %name, result = ?other, "expression produced a non-boolean result");
                        false
                    }
                    Err(e) => {
                        warn!(rule = %name, error = %e, "expression did not evaluate");
                        false
                    }
                };
                RuleHit {
                    rule: name.clone(),
                    triggered,
                }
            })
            .collect()
    }

    fn build_context(features: &[Feature]) -> HashMapContext<DefaultNumericTypes> {
        let mut context = HashMapContext::new();
        for feature in features {
            if let Err(e) = context.set_value(feature.name.clone(), feature.value.clone().into()) {
                warn!(feature = %feature.name, error = %e, "could not add feature to expression context");
            }
        }
        context
    }
}
