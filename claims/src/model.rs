use chrono::NaiveDate;
use processing::{importer::Importable, model::ModelId};
use serde::{Deserialize, Serialize};

/// One claim-centric row of the unified dataset, assembled upstream by
/// joining customer, policy, claim, injury, payment and status records.
///
/// Almost everything is nullable: scoring treats absent data as
/// non-incriminating, so a sparse record flows through the pipeline instead
/// of being rejected. The importer only enforces the invariants scoring
/// relies on (identifiers present, amounts non-negative).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimRecord {
    pub claim_id: ModelId,
    pub claim_number: String,
    pub occurrence_date: Option<NaiveDate>,
    pub report_date: Option<NaiveDate>,
    /// Hour of day the claim was reported, when the intake channel records it.
    pub report_hour: Option<u32>,
    pub claim_amount: Option<f64>,
    pub occurrence_state: Option<String>,
    pub occurrence_address: Option<String>,

    pub status_code: Option<String>,
    pub status_reason: Option<String>,
    pub status_date: Option<NaiveDate>,
    pub declined_status_count: i64,

    pub policy_number: Option<String>,
    pub policy_start_date: Option<NaiveDate>,
    pub policy_end_date: Option<NaiveDate>,
    pub policy_premium: Option<f64>,
    pub policy_claim_limit: Option<f64>,
    pub risk_level: Option<String>,

    pub insured_id: Option<ModelId>,
    pub insured_state: Option<String>,
    pub claimant_id: Option<ModelId>,
    pub claimant_state: Option<String>,
    pub claimant_age: Option<i64>,
    pub claimant_job_title: Option<String>,
    pub employment_status: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub disability_begin_date: Option<NaiveDate>,
    pub provider_id: Option<ModelId>,
    pub provider_state: Option<String>,

    pub injury_type: Option<String>,
    pub injury_body_part: Option<String>,
    pub injury_severity: Option<String>,
    pub treatment_required: Option<bool>,
    pub days_lost: Option<i64>,
    pub injury_count: i64,

    pub total_payments: Option<f64>,
    pub payment_count: i64,
}

impl Importable for ClaimRecord {
    fn validate(&self) -> Result<(), String> {
        if self.claim_id <= 0 {
            return Err("claim_id must be positive".to_string());
        }
        if self.claim_number.trim().is_empty() {
            return Err("claim_number must not be empty".to_string());
        }
        for (field, value) in [
            ("claim_amount", self.claim_amount),
            ("policy_premium", self.policy_premium),
            ("policy_claim_limit", self.policy_claim_limit),
            ("total_payments", self.total_payments),
        ] {
            if let Some(amount) = value {
                if amount < 0.0 {
                    return Err(format!("{field} must be non-negative"));
                }
            }
        }
        if let Some(hour) = self.report_hour {
            if hour > 23 {
                return Err("report_hour must be within 0..=23".to_string());
            }
        }
        if self.injury_count < 0 || self.payment_count < 0 || self.declined_status_count < 0 {
            return Err("counts must be non-negative".to_string());
        }

        Ok(())
    }
}
