use crate::{aggregates::DatasetAggregates, holiday, model::ClaimRecord};
use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use processing::model::{Feature, ModelId, Scorable};
use std::collections::HashSet;

/// Every feature name the extractor may emit. Rules are validated against
/// this set before a batch runs; referencing anything else is a
/// configuration error, not a silent non-trigger.
pub const FEATURE_SCHEMA: &[&str] = &[
    // raw claim fields
    "claim_amount",
    "occurrence_date",
    "report_date",
    "report_hour",
    "occurrence_state",
    "status_code",
    "status_reason",
    "status_date",
    "declined_status_count",
    // policy
    "policy_start_date",
    "policy_end_date",
    "policy_premium",
    "policy_claim_limit",
    "risk_level",
    // parties
    "insured_state",
    "claimant_state",
    "claimant_age",
    "claimant_job_title",
    "employment_status",
    "hire_date",
    "disability_begin_date",
    "provider_state",
    // injury and payments
    "injury_type",
    "injury_body_part",
    "injury_severity",
    "treatment_required",
    "days_lost",
    "injury_count",
    "total_payments",
    "payment_count",
    // derived
    "days_to_report",
    "days_to_policy_end",
    "days_from_policy_start",
    "days_to_status",
    "pending_age_days",
    "occurred_weekend",
    "reported_weekend",
    "occurred_holiday",
    "reported_holiday",
    // dataset aggregates
    "days_since_previous_claim",
    "claimant_claim_count",
    "claimant_state_count",
    "claimant_provider_count",
    "address_claim_count",
    "duplicate_claim_number",
    "avg_prior_claim_amount",
];

pub static FEATURE_NAMES: Lazy<HashSet<String>> =
    Lazy::new(|| FEATURE_SCHEMA.iter().map(|name| name.to_string()).collect());

pub fn feature_names() -> &'static HashSet<String> {
    &FEATURE_NAMES
}

impl Scorable for ClaimRecord {
    type Context = DatasetAggregates;

    fn id(&self) -> ModelId {
        self.claim_id
    }

    fn extract_features(&self, aggregates: &DatasetAggregates) -> Vec<Feature> {
        extract_features(self, aggregates)
    }
}

/// Flatten a claim into the feature vector the rules read. A null field is
/// an absent feature; in particular every day-difference feature is absent
/// whenever either operand date is missing, so date rules stay quiet on
/// incomplete records.
pub fn extract_features(record: &ClaimRecord, aggregates: &DatasetAggregates) -> Vec<Feature> {
    let mut features = Vec::with_capacity(FEATURE_SCHEMA.len());

    push_double(&mut features, "claim_amount", record.claim_amount);
    push_date(&mut features, "occurrence_date", record.occurrence_date);
    push_date(&mut features, "report_date", record.report_date);
    push_int(&mut features, "report_hour", record.report_hour.map(i64::from));
    push_text(&mut features, "occurrence_state", record.occurrence_state.as_deref());
    push_text(&mut features, "status_code", record.status_code.as_deref());
    push_text(&mut features, "status_reason", record.status_reason.as_deref());
    push_date(&mut features, "status_date", record.status_date);
    features.push(Feature::int("declined_status_count", record.declined_status_count));

    push_date(&mut features, "policy_start_date", record.policy_start_date);
    push_date(&mut features, "policy_end_date", record.policy_end_date);
    push_double(&mut features, "policy_premium", record.policy_premium);
    push_double(&mut features, "policy_claim_limit", record.policy_claim_limit);
    push_text(&mut features, "risk_level", record.risk_level.as_deref());

    push_text(&mut features, "insured_state", record.insured_state.as_deref());
    push_text(&mut features, "claimant_state", record.claimant_state.as_deref());
    push_int(&mut features, "claimant_age", record.claimant_age);
    push_text(&mut features, "claimant_job_title", record.claimant_job_title.as_deref());
    push_text(&mut features, "employment_status", record.employment_status.as_deref());
    push_date(&mut features, "hire_date", record.hire_date);
    push_date(&mut features, "disability_begin_date", record.disability_begin_date);
    push_text(&mut features, "provider_state", record.provider_state.as_deref());

    push_text(&mut features, "injury_type", record.injury_type.as_deref());
    push_text(&mut features, "injury_body_part", record.injury_body_part.as_deref());
    push_text(&mut features, "injury_severity", record.injury_severity.as_deref());
    push_flag(&mut features, "treatment_required", record.treatment_required);
    push_int(&mut features, "days_lost", record.days_lost);
    features.push(Feature::int("injury_count", record.injury_count));
    push_double(&mut features, "total_payments", record.total_payments);
    features.push(Feature::int("payment_count", record.payment_count));

    push_int(
        &mut features,
        "days_to_report",
        day_diff(record.occurrence_date, record.report_date),
    );
    push_int(
        &mut features,
        "days_to_policy_end",
        day_diff(record.occurrence_date, record.policy_end_date),
    );
    push_int(
        &mut features,
        "days_from_policy_start",
        day_diff(record.policy_start_date, record.occurrence_date),
    );
    push_int(
        &mut features,
        "days_to_status",
        day_diff(record.report_date, record.status_date),
    );
    // Pending age counts from the last status change, falling back to the
    // report date for claims that never left intake.
    push_int(
        &mut features,
        "pending_age_days",
        day_diff(
            record.status_date.or(record.report_date),
            aggregates.as_of_date(),
        ),
    );

    push_flag(
        &mut features,
        "occurred_weekend",
        record.occurrence_date.map(is_weekend),
    );
    push_flag(
        &mut features,
        "reported_weekend",
        record.report_date.map(is_weekend),
    );
    push_flag(
        &mut features,
        "occurred_holiday",
        record.occurrence_date.map(holiday::is_federal_holiday),
    );
    push_flag(
        &mut features,
        "reported_holiday",
        record.report_date.map(holiday::is_federal_holiday),
    );

    push_int(
        &mut features,
        "days_since_previous_claim",
        aggregates.days_since_previous(record.claim_id),
    );
    if let Some(claimant) = record.claimant_id {
        push_int(
            &mut features,
            "claimant_claim_count",
            aggregates.claimant_claim_count(claimant),
        );
        push_int(
            &mut features,
            "claimant_state_count",
            aggregates.claimant_state_count(claimant),
        );
        push_int(
            &mut features,
            "claimant_provider_count",
            aggregates.claimant_provider_count(claimant),
        );
    }
    if let Some(address) = &record.occurrence_address {
        push_int(
            &mut features,
            "address_claim_count",
            aggregates.address_claim_count(address),
        );
    }
    features.push(Feature::flag(
        "duplicate_claim_number",
        aggregates.is_duplicate_claim_number(&record.claim_number),
    ));
    push_double(
        &mut features,
        "avg_prior_claim_amount",
        aggregates.avg_prior_amount(record.claim_id),
    );

    features
}

fn day_diff(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<i64> {
    match (from, to) {
        (Some(from), Some(to)) => Some((to - from).num_days()),
        _ => None,
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn push_double(features: &mut Vec<Feature>, name: &str, value: Option<f64>) {
    if let Some(value) = value {
        features.push(Feature::double(name, value));
    }
}

fn push_int(features: &mut Vec<Feature>, name: &str, value: Option<i64>) {
    if let Some(value) = value {
        features.push(Feature::int(name, value));
    }
}

fn push_text(features: &mut Vec<Feature>, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        features.push(Feature::text(name, value));
    }
}

fn push_date(features: &mut Vec<Feature>, name: &str, value: Option<NaiveDate>) {
    if let Some(value) = value {
        features.push(Feature::date(name, value));
    }
}

fn push_flag(features: &mut Vec<Feature>, name: &str, value: Option<bool>) {
    if let Some(value) = value {
        features.push(Feature::flag(name, value));
    }
}
