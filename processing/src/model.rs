use chrono::{Datelike, NaiveDate};
use evalexpr::{DefaultNumericTypes, Value as EvalValue};
use serde::{Deserialize, Serialize};
use std::error::Error;

pub type ModelId = i64;

pub type GenericError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    Int(i64),
    Double(f64),
    String(String),
    Bool(bool),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub value: FeatureValue,
}

impl Feature {
    pub fn int(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            value: FeatureValue::Int(value),
        }
    }

    pub fn double(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value: FeatureValue::Double(value),
        }
    }

    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: FeatureValue::String(value.to_string()),
        }
    }

    pub fn flag(name: &str, value: bool) -> Self {
        Self {
            name: name.to_string(),
            value: FeatureValue::Bool(value),
        }
    }

    pub fn date(name: &str, value: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            value: FeatureValue::Date(value),
        }
    }
}

/// Dates become day numbers inside expression contexts so custom rules can
/// compare and subtract them.
impl From<FeatureValue> for EvalValue<DefaultNumericTypes> {
    fn from(value: FeatureValue) -> Self {
        match value {
            FeatureValue::Int(v) => EvalValue::Int(v),
            FeatureValue::Double(v) => EvalValue::Float(v),
            FeatureValue::String(v) => EvalValue::String(v),
            FeatureValue::Bool(v) => EvalValue::Boolean(v),
            FeatureValue::Date(v) => EvalValue::Int(i64::from(v.num_days_from_ce())),
        }
    }
}

pub fn find<'a>(features: &'a [Feature], name: &str) -> Option<&'a FeatureValue> {
    features.iter().find(|f| f.name == name).map(|f| &f.value)
}

pub fn int_feature(features: &[Feature], name: &str) -> Option<i64> {
    match find(features, name)? {
        FeatureValue::Int(v) => Some(*v),
        _ => None,
    }
}

/// Numeric lookup; integer features widen to doubles so ratio rules do not
/// care how the extractor typed the column.
pub fn double_feature(features: &[Feature], name: &str) -> Option<f64> {
    match find(features, name)? {
        FeatureValue::Double(v) => Some(*v),
        FeatureValue::Int(v) => Some(*v as f64),
        _ => None,
    }
}

pub fn text_feature<'a>(features: &'a [Feature], name: &str) -> Option<&'a str> {
    match find(features, name)? {
        FeatureValue::String(v) => Some(v.as_str()),
        _ => None,
    }
}

pub fn flag_feature(features: &[Feature], name: &str) -> Option<bool> {
    match find(features, name)? {
        FeatureValue::Bool(v) => Some(*v),
        _ => None,
    }
}

pub fn date_feature(features: &[Feature], name: &str) -> Option<NaiveDate> {
    match find(features, name)? {
        FeatureValue::Date(v) => Some(*v),
        _ => None,
    }
}

/// One rule outcome for one record. Every rule in the registry produces a
/// hit, triggered or not, so the scored output carries a full audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleHit {
    pub rule: String,
    pub triggered: bool,
}

/// A record the batch processor can score. `Context` carries dataset-wide
/// aggregates computed once, up front, and read-only during scoring.
pub trait Scorable: Send + Sync {
    type Context;

    fn id(&self) -> ModelId;
    fn extract_features(&self, context: &Self::Context) -> Vec<Feature>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord<P> {
    pub record: P,
    pub hits: Vec<RuleHit>,
    pub fraud_indicator: bool,
    pub fraud_reason: String,
    /// Set when the rate controller flipped this record's label.
    pub relabeled: bool,
}
