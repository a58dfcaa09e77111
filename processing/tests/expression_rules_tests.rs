use chrono::NaiveDate;
use common::config::CustomRule;
use processing::{error::PipelineError, expression::ExpressionRules, model::Feature};
use std::collections::HashSet;

fn custom(name: &str, expression: &str) -> CustomRule {
    CustomRule {
        name: name.to_string(),
        expression: expression.to_string(),
    }
}

#[test]
fn expression_rule_triggers_on_matching_features() {
    let rules = ExpressionRules::compile(&[custom(
        "amount_outruns_premium",
        "claim_amount > 2.0 * policy_premium",
    )])
    .unwrap();

    let features = vec![
        Feature::double("claim_amount", 5000.0),
        Feature::double("policy_premium", 1200.0),
    ];
    let hits = rules.evaluate(&features);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].rule, "amount_outruns_premium");
    assert!(hits[0].triggered);

    let features = vec![
        Feature::double("claim_amount", 2000.0),
        Feature::double("policy_premium", 1200.0),
    ];
    assert!(!rules.evaluate(&features)[0].triggered);
}

#[test]
fn missing_variable_resolves_to_not_triggered() {
    let rules =
        ExpressionRules::compile(&[custom("needs_amount", "claim_amount > 100.0")]).unwrap();

    let hits = rules.evaluate(&[]);
    assert_eq!(hits.len(), 1);
    assert!(!hits[0].triggered);
}

#[test]
fn date_features_compare_as_day_numbers() {
    let rules = ExpressionRules::compile(&[custom(
        "reported_before_occurrence",
        "report_date < occurrence_date",
    )])
    .unwrap();

    let features = vec![
        Feature::date("report_date", NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
        Feature::date(
            "occurrence_date",
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        ),
    ];
    assert!(rules.evaluate(&features)[0].triggered);
}

#[test]
fn invalid_syntax_is_a_startup_error() {
    let err = ExpressionRules::compile(&[custom("broken", "claim_amount * )")]).unwrap_err();
    match err {
        PipelineError::InvalidExpression { name, .. } => assert_eq!(name, "broken"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_variables_fail_validation() {
    let rules = ExpressionRules::compile(&[custom("phantom", "no_such_feature > 1")]).unwrap();
    let known: HashSet<String> = ["claim_amount".to_string()].into_iter().collect();

    let err = rules.validate(&known).unwrap_err();
    match err {
        PipelineError::UnknownFeature { rule, feature } => {
            assert_eq!(rule, "phantom");
            assert_eq!(feature, "no_such_feature");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn non_boolean_results_do_not_trigger() {
    let rules = ExpressionRules::compile(&[custom("arithmetic", "claim_amount + 1.0")]).unwrap();
    let features = vec![Feature::double("claim_amount", 10.0)];
    assert!(!rules.evaluate(&features)[0].triggered);
}
