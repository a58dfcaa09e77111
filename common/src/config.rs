use chrono::NaiveDate;
use serde::Deserialize;
use std::{error::Error, fs};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommonConfig {
    pub project_name: String,
    pub database_url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImporterConfig {
    pub input_path: String,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProcessorConfig {
    pub log_level: String,
}

/// How per-rule outcomes are folded into the fraud indicator.
///
/// `any-trigger` marks a record fraudulent as soon as one rule fires;
/// `count-threshold` requires at least `threshold` rules to fire.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    #[default]
    AnyTrigger,
    CountThreshold,
}

/// A custom scoring rule given as an expression over the feature context,
/// e.g. `claim_amount > 2.0 * policy_premium`.
#[derive(Debug, Deserialize, Clone)]
pub struct CustomRule {
    pub name: String,
    pub expression: String,
}

/// An injury type / body part combination considered implausible.
#[derive(Debug, Deserialize, Clone)]
pub struct InjuryPair {
    pub injury_type: String,
    pub body_part: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScoringConfig {
    pub mode: AggregationMode,
    /// Minimum number of triggered rules under `count-threshold`.
    pub threshold: usize,
    pub disabled_rules: Vec<String>,
    /// Reference date for pending-age rules. When unset those rules never fire.
    pub as_of_date: Option<NaiveDate>,
    pub thresholds: RuleThresholds,
    pub desk_jobs: Vec<String>,
    pub high_risk_injuries: Vec<String>,
    pub implausible_injuries: Vec<InjuryPair>,
    pub custom_rules: Vec<CustomRule>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode: AggregationMode::AnyTrigger,
            threshold: 3,
            disabled_rules: Vec::new(),
            as_of_date: None,
            thresholds: RuleThresholds::default(),
            desk_jobs: vec![
                "Software Engineer".to_string(),
                "Office Clerk".to_string(),
                "Data Analyst".to_string(),
                "Office Manager".to_string(),
                "Accountant".to_string(),
            ],
            high_risk_injuries: vec![
                "Burn".to_string(),
                "Fracture".to_string(),
                "Sprain".to_string(),
            ],
            implausible_injuries: vec![
                InjuryPair {
                    injury_type: "Burn".to_string(),
                    body_part: "Back".to_string(),
                },
                InjuryPair {
                    injury_type: "Burn".to_string(),
                    body_part: "Head".to_string(),
                },
                InjuryPair {
                    injury_type: "Fracture".to_string(),
                    body_part: "Neck".to_string(),
                },
                InjuryPair {
                    injury_type: "Amputation".to_string(),
                    body_part: "Head".to_string(),
                },
                InjuryPair {
                    injury_type: "Amputation".to_string(),
                    body_part: "Chest".to_string(),
                },
                InjuryPair {
                    injury_type: "Amputation".to_string(),
                    body_part: "Back".to_string(),
                },
            ],
            custom_rules: Vec::new(),
        }
    }
}

/// Every numeric cutoff used by the rule catalog. The source material for
/// these rules hard-coded each value inline; here they are all settable.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RuleThresholds {
    pub late_report_days: i64,
    pub near_expiry_days: i64,
    pub new_policy_days: i64,
    pub pending_age_days: i64,
    pub late_status_days: i64,
    pub night_hour_start: u32,
    pub night_hour_end: u32,
    pub limit_ratio: f64,
    pub premium_multiple: f64,
    pub premium_floor_ratio: f64,
    pub history_spike_factor: f64,
    pub overpayment_ratio: f64,
    pub high_severity_days_lost: i64,
    pub low_severity_days_lost: i64,
    pub repeat_claim_window_days: i64,
    pub max_claims_per_claimant: i64,
    pub max_providers_per_claimant: i64,
    pub max_claims_per_address: i64,
    pub max_injuries_per_claim: i64,
    pub high_age: i64,
    pub low_age: i64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            late_report_days: 30,
            near_expiry_days: 7,
            new_policy_days: 14,
            pending_age_days: 180,
            late_status_days: 60,
            night_hour_start: 22,
            night_hour_end: 6,
            limit_ratio: 0.9,
            premium_multiple: 5.0,
            premium_floor_ratio: 0.05,
            history_spike_factor: 3.0,
            overpayment_ratio: 1.2,
            high_severity_days_lost: 7,
            low_severity_days_lost: 30,
            repeat_claim_window_days: 30,
            max_claims_per_claimant: 5,
            max_providers_per_claimant: 5,
            max_claims_per_address: 3,
            max_injuries_per_claim: 2,
            high_age: 70,
            low_age: 18,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RebalanceConfig {
    /// Target fraction of fraudulent records in the scored dataset.
    pub target_fraction: f64,
    pub seed: u64,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            target_fraction: 0.15,
            seed: 42,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub common: CommonConfig,
    pub importer: ImporterConfig,
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub rebalance: RebalanceConfig,
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let contents = fs::read_to_string(config_path)?;
        let config: Config = serde_yml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Configuration problems are fatal before any record is processed.
    pub fn validate(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if !(0.0..=1.0).contains(&self.rebalance.target_fraction) {
            return Err(format!(
                "rebalance.target_fraction must be within [0, 1], got {}",
                self.rebalance.target_fraction
            )
            .into());
        }
        if self.scoring.mode == AggregationMode::CountThreshold && self.scoring.threshold == 0 {
            return Err("scoring.threshold must be at least 1 under count-threshold".into());
        }

        Ok(())
    }
}
