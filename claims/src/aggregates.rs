use crate::model::ClaimRecord;
use chrono::NaiveDate;
use processing::model::ModelId;
use std::collections::{HashMap, HashSet};

/// Dataset-wide statistics the frequency rules consume. Everything is
/// computed here in one grouping pass before scoring starts and is read-only
/// afterwards; no rule recomputes its own aggregate.
#[derive(Debug, Default)]
pub struct DatasetAggregates {
    as_of_date: Option<NaiveDate>,
    claims_per_claimant: HashMap<ModelId, i64>,
    states_per_claimant: HashMap<ModelId, i64>,
    providers_per_claimant: HashMap<ModelId, i64>,
    claims_per_address: HashMap<String, i64>,
    duplicate_claim_numbers: HashSet<String>,
    days_since_previous: HashMap<ModelId, i64>,
    avg_prior_amount: HashMap<ModelId, f64>,
}

impl DatasetAggregates {
    /// `as_of_date` is the reference date for pending-age rules; it is
    /// carried here so feature extraction stays a pure function of the
    /// record plus this context.
    pub fn build(records: &[ClaimRecord], as_of_date: Option<NaiveDate>) -> Self {
        let mut claims_per_claimant: HashMap<ModelId, i64> = HashMap::new();
        let mut state_sets: HashMap<ModelId, HashSet<&str>> = HashMap::new();
        let mut provider_sets: HashMap<ModelId, HashSet<ModelId>> = HashMap::new();
        let mut claims_per_address: HashMap<String, i64> = HashMap::new();
        let mut claim_number_counts: HashMap<&str, i64> = HashMap::new();
        let mut by_claimant: HashMap<ModelId, Vec<(ModelId, NaiveDate)>> = HashMap::new();
        let mut by_insured: HashMap<ModelId, Vec<(ModelId, NaiveDate, Option<f64>)>> =
            HashMap::new();

        for record in records {
            *claim_number_counts
                .entry(record.claim_number.as_str())
                .or_default() += 1;

            if let Some(address) = &record.occurrence_address {
                *claims_per_address.entry(address.clone()).or_default() += 1;
            }

            if let Some(claimant) = record.claimant_id {
                *claims_per_claimant.entry(claimant).or_default() += 1;
                if let Some(state) = &record.occurrence_state {
                    state_sets.entry(claimant).or_default().insert(state);
                }
                if let Some(provider) = record.provider_id {
                    provider_sets.entry(claimant).or_default().insert(provider);
                }
                if let Some(date) = record.occurrence_date {
                    by_claimant
                        .entry(claimant)
                        .or_default()
                        .push((record.claim_id, date));
                }
            }

            if let Some(insured) = record.insured_id {
                if let Some(date) = record.occurrence_date {
                    by_insured.entry(insured).or_default().push((
                        record.claim_id,
                        date,
                        record.claim_amount,
                    ));
                }
            }
        }

        let mut days_since_previous = HashMap::new();
        for claims in by_claimant.values_mut() {
            claims.sort_by_key(|(claim_id, date)| (*date, *claim_id));
            for window in claims.windows(2) {
                let (claim_id, date) = window[1];
                let (_, previous) = window[0];
                days_since_previous.insert(claim_id, (date - previous).num_days());
            }
        }

        // Running mean of the amounts of each insured's earlier claims, in
        // occurrence order. Claims without an amount still advance the order
        // but contribute nothing to the mean.
        let mut avg_prior_amount = HashMap::new();
        for claims in by_insured.values_mut() {
            claims.sort_by_key(|(claim_id, date, _)| (*date, *claim_id));
            let mut sum = 0.0;
            let mut count = 0usize;
            for (claim_id, _, amount) in claims.iter() {
                if count > 0 {
                    avg_prior_amount.insert(*claim_id, sum / count as f64);
                }
                if let Some(amount) = amount {
                    sum += amount;
                    count += 1;
                }
            }
        }

        Self {
            as_of_date,
            claims_per_claimant,
            states_per_claimant: state_sets
                .into_iter()
                .map(|(claimant, states)| (claimant, states.len() as i64))
                .collect(),
            providers_per_claimant: provider_sets
                .into_iter()
                .map(|(claimant, providers)| (claimant, providers.len() as i64))
                .collect(),
            claims_per_address,
            duplicate_claim_numbers: claim_number_counts
                .into_iter()
                .filter(|(_, count)| *count > 1)
                .map(|(number, _)| number.to_string())
                .collect(),
            days_since_previous,
            avg_prior_amount,
        }
    }

    pub fn as_of_date(&self) -> Option<NaiveDate> {
        self.as_of_date
    }

    pub fn claimant_claim_count(&self, claimant: ModelId) -> Option<i64> {
        self.claims_per_claimant.get(&claimant).copied()
    }

    pub fn claimant_state_count(&self, claimant: ModelId) -> Option<i64> {
        self.states_per_claimant.get(&claimant).copied()
    }

    pub fn claimant_provider_count(&self, claimant: ModelId) -> Option<i64> {
        self.providers_per_claimant.get(&claimant).copied()
    }

    pub fn address_claim_count(&self, address: &str) -> Option<i64> {
        self.claims_per_address.get(address).copied()
    }

    pub fn is_duplicate_claim_number(&self, number: &str) -> bool {
        self.duplicate_claim_numbers.contains(number)
    }

    /// Days between this claim's occurrence and the same claimant's previous
    /// one; `None` for a claimant's first claim.
    pub fn days_since_previous(&self, claim_id: ModelId) -> Option<i64> {
        self.days_since_previous.get(&claim_id).copied()
    }

    /// Mean amount of the insured's earlier claims; `None` when there is no
    /// priced history before this claim.
    pub fn avg_prior_amount(&self, claim_id: ModelId) -> Option<f64> {
        self.avg_prior_amount.get(&claim_id).copied()
    }
}
