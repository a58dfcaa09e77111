use chrono::NaiveDate;
use claims::{
    aggregates::DatasetAggregates, features, model::ClaimRecord, rule_catalog,
    sqlite_storage::SqliteClaimStorage,
};
use common::{config::ScoringConfig, test_helpers::temp_database};
use processing::{
    expression::ExpressionRules, importer, processor::BatchProcessor, rebalance::Rebalancer,
    storage::BatchStorage,
};
use std::io::Write;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn claim(claim_id: i64, late: bool) -> ClaimRecord {
    let occurred = date(2024, 3, 5);
    let reported = if late {
        date(2024, 4, 20)
    } else {
        date(2024, 3, 12)
    };
    ClaimRecord {
        claim_id,
        claim_number: format!("2024{claim_id:06}"),
        occurrence_date: Some(occurred),
        report_date: Some(reported),
        claim_amount: Some(4000.0),
        occurrence_state: Some("CA".to_string()),
        status_code: Some("Approved".to_string()),
        status_date: Some(reported + chrono::Duration::days(3)),
        policy_start_date: Some(date(2023, 9, 1)),
        policy_end_date: Some(date(2024, 8, 31)),
        policy_premium: Some(2500.0),
        policy_claim_limit: Some(50000.0),
        insured_id: Some(1000 + claim_id),
        insured_state: Some("CA".to_string()),
        claimant_id: Some(2000 + claim_id),
        claimant_state: Some("CA".to_string()),
        claimant_age: Some(40),
        employment_status: Some("Active".to_string()),
        provider_id: Some(3000 + claim_id),
        provider_state: Some("CA".to_string()),
        injury_severity: Some("Medium".to_string()),
        treatment_required: Some(true),
        days_lost: Some(20),
        injury_count: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn full_batch_from_ndjson_to_scored_store() {
    // Ten claims, four of them reported 46 days late, plus two bad lines the
    // importer must drop.
    let mut ndjson = String::new();
    for id in 1..=10 {
        let record = claim(id, id <= 4);
        ndjson.push_str(&serde_json::to_string(&record).unwrap());
        ndjson.push('\n');
    }
    ndjson.push_str("this is not json\n");
    let invalid = ClaimRecord {
        claim_amount: Some(-5.0),
        ..claim(11, false)
    };
    ndjson.push_str(&serde_json::to_string(&invalid).unwrap());
    ndjson.push('\n');

    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("unified_claims.ndjson");
    let mut file = std::fs::File::create(&input_path).unwrap();
    file.write_all(ndjson.as_bytes()).unwrap();

    // Import stage.
    let (records, summary) = importer::read_batch::<ClaimRecord>(&input_path).unwrap();
    assert_eq!(summary.accepted, 10);
    assert_eq!(summary.rejected, 2);

    let (_db_dir, url) = temp_database();
    let storage = SqliteClaimStorage::new(&url).await.unwrap();
    storage.initialize_schema().await.unwrap();
    storage.save_records(&records).await.unwrap();

    // Scoring stage.
    let scoring = ScoringConfig::default();
    let loaded = storage.load_records().await.unwrap();
    assert_eq!(loaded.len(), 10);

    let aggregates = DatasetAggregates::build(&loaded, scoring.as_of_date);
    let rules = rule_catalog::build_rule_set(&scoring).unwrap();
    let expressions = ExpressionRules::compile(&scoring.custom_rules).unwrap();
    let processor =
        BatchProcessor::new(rules, expressions, &scoring, features::feature_names()).unwrap();
    let mut scored = processor.score_batch(loaded, &aggregates);

    let flagged = scored.iter().filter(|s| s.fraud_indicator).count();
    assert_eq!(flagged, 4);

    // Rate control stage: 10 records at a 20% target keeps 2 fraudulent.
    let report = Rebalancer::new(0.2, 42).rebalance(&mut scored);
    assert_eq!(report.target, 2);
    assert_eq!(report.downgraded, 2);
    assert_eq!(report.fraud_after, 2);

    storage.save_scored(&scored).await.unwrap();

    // Persisted output matches the in-memory batch.
    let rows = storage.load_scored().await.unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows.iter().filter(|r| r.fraud_indicator).count(), 2);

    let relabeled: Vec<_> = rows.iter().filter(|r| r.relabeled).collect();
    assert_eq!(relabeled.len(), 2);
    for row in relabeled {
        assert!(!row.fraud_indicator);
        assert_eq!(
            row.fraud_reason,
            processing::rebalance::REASON_RELABELED_CLEAR
        );
    }

    // Fraudulent survivors keep the reason the rules produced.
    for row in rows.iter().filter(|r| r.fraud_indicator) {
        assert!(row.fraud_reason.contains("late_report"));
    }

    // The audit trail records every rule for every claim.
    let outcomes = storage.load_rule_outcomes(1).await.unwrap();
    assert!(!outcomes.is_empty());
    assert!(
        outcomes
            .iter()
            .any(|(rule, triggered)| rule == "late_report" && *triggered)
    );
}

#[tokio::test]
async fn rerunning_the_processor_is_deterministic() {
    let records: Vec<ClaimRecord> = (1..=20).map(|id| claim(id, id % 3 == 0)).collect();

    let scoring = ScoringConfig::default();
    let aggregates = DatasetAggregates::build(&records, scoring.as_of_date);
    let rules = rule_catalog::build_rule_set(&scoring).unwrap();
    let expressions = ExpressionRules::compile(&scoring.custom_rules).unwrap();
    let processor =
        BatchProcessor::new(rules, expressions, &scoring, features::feature_names()).unwrap();

    let mut first = processor.score_batch(records.clone(), &aggregates);
    Rebalancer::new(0.15, 42).rebalance(&mut first);

    let rules = rule_catalog::build_rule_set(&scoring).unwrap();
    let expressions = ExpressionRules::compile(&scoring.custom_rules).unwrap();
    let processor =
        BatchProcessor::new(rules, expressions, &scoring, features::feature_names()).unwrap();
    let mut second = processor.score_batch(records, &aggregates);
    Rebalancer::new(0.15, 42).rebalance(&mut second);

    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.record.claim_id, b.record.claim_id);
        assert_eq!(a.fraud_indicator, b.fraud_indicator);
        assert_eq!(a.fraud_reason, b.fraud_reason);
        assert_eq!(a.relabeled, b.relabeled);
    }
}
