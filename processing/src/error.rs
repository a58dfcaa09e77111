use thiserror::Error;

/// Failures surfaced before or during a scoring batch. Anything here that is
/// a configuration or schema problem is raised before the first record is
/// evaluated; per-record data problems never become errors, they resolve to
/// non-triggering rules.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("rule `{rule}` requires unknown feature `{feature}`")]
    UnknownFeature { rule: String, feature: String },

    #[error("unknown rule name `{0}` in disabled_rules")]
    UnknownRule(String),

    #[error("invalid expression for rule `{name}`: {message}")]
    InvalidExpression { name: String, message: String },
}
