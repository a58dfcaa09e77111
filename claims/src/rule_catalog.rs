use common::config::ScoringConfig;
use processing::{error::PipelineError, model, rules::RuleSet};
use std::collections::HashSet;

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_DECLINED: &str = "Declined";
const INSUFFICIENT_EVIDENCE: &str = "Insufficient Evidence";
const SEVERITY_HIGH: &str = "High";
const SEVERITY_LOW: &str = "Low";
const EMPLOYMENT_TERMINATED: &str = "Terminated";

/// The consolidated rule registry. The source material for these rules grew
/// as several divergent variants of the same list; here every variant's test
/// lives once, under one name, with its cutoff taken from configuration.
/// `disabled_rules` picks the active subset.
pub fn build_rule_set(scoring: &ScoringConfig) -> Result<RuleSet, PipelineError> {
    let mut rules = full_catalog(scoring);

    let names: Vec<String> = rules.names().iter().map(|n| n.to_string()).collect();
    for name in &scoring.disabled_rules {
        if !names.iter().any(|n| n == name) {
            return Err(PipelineError::UnknownRule(name.clone()));
        }
    }

    let disabled: HashSet<&str> = scoring.disabled_rules.iter().map(|n| n.as_str()).collect();
    rules.retain(|name| !disabled.contains(name));

    Ok(rules)
}

fn full_catalog(scoring: &ScoringConfig) -> RuleSet {
    let t = &scoring.thresholds;
    let mut rules = RuleSet::new();

    // Temporal anomalies

    rules.add_rule(
        "report_before_occurrence",
        &["occurrence_date", "report_date"],
        |f| {
            match (
                model::date_feature(f, "report_date"),
                model::date_feature(f, "occurrence_date"),
            ) {
                (Some(report), Some(occurrence)) => report < occurrence,
                _ => false,
            }
        },
    );

    let late_days = t.late_report_days;
    rules.add_rule("late_report", &["days_to_report"], move |f| {
        model::int_feature(f, "days_to_report").is_some_and(|d| d > late_days)
    });

    rules.add_rule("same_day_report", &["days_to_report"], |f| {
        model::int_feature(f, "days_to_report").is_some_and(|d| d < 1)
    });

    rules.add_rule(
        "occurrence_after_policy_end",
        &["occurrence_date", "policy_end_date"],
        |f| {
            match (
                model::date_feature(f, "occurrence_date"),
                model::date_feature(f, "policy_end_date"),
            ) {
                (Some(occurrence), Some(end)) => occurrence > end,
                _ => false,
            }
        },
    );

    rules.add_rule(
        "occurrence_before_policy_start",
        &["occurrence_date", "policy_start_date"],
        |f| {
            match (
                model::date_feature(f, "occurrence_date"),
                model::date_feature(f, "policy_start_date"),
            ) {
                (Some(occurrence), Some(start)) => occurrence < start,
                _ => false,
            }
        },
    );

    let near_expiry = t.near_expiry_days;
    rules.add_rule("near_policy_expiry", &["days_to_policy_end"], move |f| {
        model::int_feature(f, "days_to_policy_end").is_some_and(|d| (0..near_expiry).contains(&d))
    });

    let new_policy = t.new_policy_days;
    rules.add_rule("early_policy_claim", &["days_from_policy_start"], move |f| {
        model::int_feature(f, "days_from_policy_start").is_some_and(|d| d > 0 && d <= new_policy)
    });

    rules.add_rule("weekend_occurrence", &["occurred_weekend"], |f| {
        model::flag_feature(f, "occurred_weekend") == Some(true)
    });

    rules.add_rule("weekend_report", &["reported_weekend"], |f| {
        model::flag_feature(f, "reported_weekend") == Some(true)
    });

    rules.add_rule("holiday_occurrence", &["occurred_holiday"], |f| {
        model::flag_feature(f, "occurred_holiday") == Some(true)
    });

    let night_start = i64::from(t.night_hour_start);
    let night_end = i64::from(t.night_hour_end);
    rules.add_rule("unusual_report_hour", &["report_hour"], move |f| {
        model::int_feature(f, "report_hour").is_some_and(|h| h >= night_start || h <= night_end)
    });

    let pending_days = t.pending_age_days;
    rules.add_rule(
        "stale_pending_status",
        &["pending_age_days", "status_code"],
        move |f| {
            // An unset status code reads as still pending.
            let still_pending = match model::text_feature(f, "status_code") {
                None => true,
                Some(code) => code == STATUS_PENDING,
            };
            still_pending
                && model::int_feature(f, "pending_age_days").is_some_and(|d| d > pending_days)
        },
    );

    let late_status = t.late_status_days;
    rules.add_rule("late_status_change", &["days_to_status"], move |f| {
        model::int_feature(f, "days_to_status").is_some_and(|d| d > late_status)
    });

    // Financial anomalies

    let limit_ratio = t.limit_ratio;
    rules.add_rule(
        "amount_near_limit",
        &["claim_amount", "policy_claim_limit"],
        move |f| {
            match (
                model::double_feature(f, "claim_amount"),
                model::double_feature(f, "policy_claim_limit"),
            ) {
                (Some(amount), Some(limit)) => limit > 0.0 && amount >= limit_ratio * limit,
                _ => false,
            }
        },
    );

    rules.add_rule(
        "amount_exceeds_limit",
        &["claim_amount", "policy_claim_limit"],
        |f| {
            match (
                model::double_feature(f, "claim_amount"),
                model::double_feature(f, "policy_claim_limit"),
            ) {
                (Some(amount), Some(limit)) => amount > limit,
                _ => false,
            }
        },
    );

    let premium_multiple = t.premium_multiple;
    rules.add_rule(
        "amount_outpaces_premium",
        &["claim_amount", "policy_premium"],
        move |f| {
            match (
                model::double_feature(f, "claim_amount"),
                model::double_feature(f, "policy_premium"),
            ) {
                (Some(amount), Some(premium)) => amount > premium_multiple * premium,
                _ => false,
            }
        },
    );

    let premium_floor = t.premium_floor_ratio;
    rules.add_rule(
        "premium_too_low",
        &["claim_amount", "policy_premium"],
        move |f| {
            match (
                model::double_feature(f, "claim_amount"),
                model::double_feature(f, "policy_premium"),
            ) {
                (Some(amount), Some(premium)) => premium < premium_floor * amount,
                _ => false,
            }
        },
    );

    let spike_factor = t.history_spike_factor;
    rules.add_rule(
        "amount_spike_vs_history",
        &["claim_amount", "avg_prior_claim_amount"],
        move |f| {
            match (
                model::double_feature(f, "claim_amount"),
                model::double_feature(f, "avg_prior_claim_amount"),
            ) {
                (Some(amount), Some(average)) => average > 0.0 && amount > spike_factor * average,
                _ => false,
            }
        },
    );

    let overpayment = t.overpayment_ratio;
    rules.add_rule("overpayment", &["total_payments", "claim_amount"], move |f| {
        match (
            model::double_feature(f, "total_payments"),
            model::double_feature(f, "claim_amount"),
        ) {
            (Some(payments), Some(amount)) => payments > overpayment * amount,
            _ => false,
        }
    });

    rules.add_rule(
        "declined_with_payments",
        &["status_code", "total_payments"],
        |f| {
            model::text_feature(f, "status_code") == Some(STATUS_DECLINED)
                && model::double_feature(f, "total_payments").is_some_and(|p| p > 0.0)
        },
    );

    rules.add_rule(
        "declined_insufficient_evidence",
        &["status_code", "status_reason"],
        |f| {
            model::text_feature(f, "status_code") == Some(STATUS_DECLINED)
                && model::text_feature(f, "status_reason")
                    .is_some_and(|reason| reason.contains(INSUFFICIENT_EVIDENCE))
        },
    );

    // Identity and geography mismatches

    rules.add_rule(
        "insured_state_mismatch",
        &["occurrence_state", "insured_state"],
        |f| states_differ(f, "insured_state"),
    );

    rules.add_rule(
        "claimant_state_mismatch",
        &["occurrence_state", "claimant_state"],
        |f| states_differ(f, "claimant_state"),
    );

    rules.add_rule(
        "provider_state_mismatch",
        &["occurrence_state", "provider_state"],
        |f| states_differ(f, "provider_state"),
    );

    rules.add_rule("multi_state_claimant", &["claimant_state_count"], |f| {
        model::int_feature(f, "claimant_state_count").is_some_and(|n| n > 1)
    });

    let high_age = t.high_age;
    rules.add_rule("claimant_age_high", &["claimant_age"], move |f| {
        model::int_feature(f, "claimant_age").is_some_and(|age| age > high_age)
    });

    let low_age = t.low_age;
    rules.add_rule("claimant_age_low", &["claimant_age"], move |f| {
        model::int_feature(f, "claimant_age").is_some_and(|age| age < low_age)
    });

    // Injury plausibility

    rules.add_rule(
        "severity_without_treatment",
        &["injury_severity", "treatment_required"],
        |f| {
            model::text_feature(f, "injury_severity") == Some(SEVERITY_HIGH)
                && model::flag_feature(f, "treatment_required") == Some(false)
        },
    );

    rules.add_rule(
        "treatment_without_severity",
        &["injury_severity", "treatment_required"],
        |f| {
            model::text_feature(f, "injury_severity") == Some(SEVERITY_LOW)
                && model::flag_feature(f, "treatment_required") == Some(true)
        },
    );

    let high_severity_days = t.high_severity_days_lost;
    rules.add_rule(
        "severity_days_lost_mismatch",
        &["injury_severity", "days_lost"],
        move |f| {
            model::text_feature(f, "injury_severity") == Some(SEVERITY_HIGH)
                && model::int_feature(f, "days_lost").is_some_and(|d| d < high_severity_days)
        },
    );

    let low_severity_days = t.low_severity_days_lost;
    rules.add_rule(
        "low_severity_long_absence",
        &["injury_severity", "days_lost"],
        move |f| {
            model::text_feature(f, "injury_severity") == Some(SEVERITY_LOW)
                && model::int_feature(f, "days_lost").is_some_and(|d| d > low_severity_days)
        },
    );

    let pairs: Vec<(String, String)> = scoring
        .implausible_injuries
        .iter()
        .map(|p| (p.injury_type.clone(), p.body_part.clone()))
        .collect();
    rules.add_rule(
        "implausible_injury_combo",
        &["injury_type", "injury_body_part"],
        move |f| {
            match (
                model::text_feature(f, "injury_type"),
                model::text_feature(f, "injury_body_part"),
            ) {
                (Some(kind), Some(part)) => {
                    pairs.iter().any(|(t, b)| t == kind && b == part)
                }
                _ => false,
            }
        },
    );

    let desk_jobs = scoring.desk_jobs.clone();
    let high_risk = scoring.high_risk_injuries.clone();
    rules.add_rule(
        "occupation_injury_mismatch",
        &["claimant_job_title", "injury_type"],
        move |f| {
            match (
                model::text_feature(f, "claimant_job_title"),
                model::text_feature(f, "injury_type"),
            ) {
                (Some(job), Some(kind)) => {
                    desk_jobs.iter().any(|j| j == job) && high_risk.iter().any(|i| i == kind)
                }
                _ => false,
            }
        },
    );

    let max_injuries = t.max_injuries_per_claim;
    rules.add_rule("excessive_injuries", &["injury_count"], move |f| {
        model::int_feature(f, "injury_count").is_some_and(|n| n > max_injuries)
    });

    rules.add_rule(
        "disability_before_occurrence",
        &["disability_begin_date", "occurrence_date"],
        |f| {
            match (
                model::date_feature(f, "disability_begin_date"),
                model::date_feature(f, "occurrence_date"),
            ) {
                (Some(disability), Some(occurrence)) => disability < occurrence,
                _ => false,
            }
        },
    );

    rules.add_rule(
        "hired_after_occurrence",
        &["hire_date", "occurrence_date"],
        |f| {
            match (
                model::date_feature(f, "hire_date"),
                model::date_feature(f, "occurrence_date"),
            ) {
                (Some(hired), Some(occurrence)) => hired > occurrence,
                _ => false,
            }
        },
    );

    rules.add_rule("terminated_claimant", &["employment_status"], |f| {
        model::text_feature(f, "employment_status") == Some(EMPLOYMENT_TERMINATED)
    });

    // Behavioral and frequency anomalies

    let repeat_window = t.repeat_claim_window_days;
    rules.add_rule(
        "rapid_repeat_claims",
        &["days_since_previous_claim"],
        move |f| {
            model::int_feature(f, "days_since_previous_claim").is_some_and(|d| d <= repeat_window)
        },
    );

    let max_claims = t.max_claims_per_claimant;
    rules.add_rule("frequent_claimant", &["claimant_claim_count"], move |f| {
        model::int_feature(f, "claimant_claim_count").is_some_and(|n| n > max_claims)
    });

    rules.add_rule("duplicate_claim_number", &["duplicate_claim_number"], |f| {
        model::flag_feature(f, "duplicate_claim_number") == Some(true)
    });

    let max_providers = t.max_providers_per_claimant;
    rules.add_rule("many_providers", &["claimant_provider_count"], move |f| {
        model::int_feature(f, "claimant_provider_count").is_some_and(|n| n > max_providers)
    });

    let max_address = t.max_claims_per_address;
    rules.add_rule("crowded_address", &["address_claim_count"], move |f| {
        model::int_feature(f, "address_claim_count").is_some_and(|n| n > max_address)
    });

    rules.add_rule("repeated_declines", &["declined_status_count"], |f| {
        model::int_feature(f, "declined_status_count").is_some_and(|n| n > 1)
    });

    rules
}

fn states_differ(features: &[model::Feature], party_state: &str) -> bool {
    match (
        model::text_feature(features, "occurrence_state"),
        model::text_feature(features, party_state),
    ) {
        (Some(occurrence), Some(party)) => occurrence != party,
        _ => false,
    }
}
