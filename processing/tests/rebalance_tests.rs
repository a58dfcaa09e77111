use processing::{
    model::ScoredRecord,
    rebalance::{REASON_RELABELED_CLEAR, REASON_RELABELED_FRAUD, Rebalancer},
    verdict,
};

fn scored_batch(total: usize, fraud: usize) -> Vec<ScoredRecord<i64>> {
    (0..total)
        .map(|i| {
            let is_fraud = i < fraud;
            ScoredRecord {
                record: i as i64,
                hits: Vec::new(),
                fraud_indicator: is_fraud,
                fraud_reason: if is_fraud {
                    "late_report".to_string()
                } else {
                    verdict::REASON_NONE.to_string()
                },
                relabeled: false,
            }
        })
        .collect()
}

fn fraud_count(scored: &[ScoredRecord<i64>]) -> usize {
    scored.iter().filter(|s| s.fraud_indicator).count()
}

#[test]
fn downsamples_to_exact_target() {
    // 1000 rows with 400 fraudulent at a 15% target: exactly 250 flips.
    let mut scored = scored_batch(1000, 400);
    let report = Rebalancer::new(0.15, 42).rebalance(&mut scored);

    assert_eq!(report.target, 150);
    assert_eq!(report.downgraded, 250);
    assert_eq!(report.upgraded, 0);
    assert_eq!(report.fraud_after, 150);
    assert_eq!(fraud_count(&scored), 150);
    assert!(!report.clamped);
}

#[test]
fn upsamples_to_exact_target() {
    let mut scored = scored_batch(200, 10);
    let report = Rebalancer::new(0.30, 42).rebalance(&mut scored);

    assert_eq!(report.target, 60);
    assert_eq!(report.upgraded, 50);
    assert_eq!(report.downgraded, 0);
    assert_eq!(fraud_count(&scored), 60);
}

#[test]
fn observed_fraction_matches_target_within_rounding() {
    let mut scored = scored_batch(333, 70);
    let report = Rebalancer::new(0.15, 7).rebalance(&mut scored);

    let observed = report.fraud_after as f64 / report.total as f64;
    assert!((observed - 0.15).abs() <= 1.0 / report.total as f64);
}

#[test]
fn already_balanced_batch_is_untouched() {
    let mut scored = scored_batch(100, 15);
    let before = scored.clone();
    let report = Rebalancer::new(0.15, 42).rebalance(&mut scored);

    assert_eq!(report.upgraded, 0);
    assert_eq!(report.downgraded, 0);
    for (a, b) in before.iter().zip(scored.iter()) {
        assert_eq!(a.fraud_indicator, b.fraud_indicator);
        assert_eq!(a.fraud_reason, b.fraud_reason);
        assert!(!b.relabeled);
    }
}

#[test]
fn empty_batch_is_a_noop() {
    let mut scored: Vec<ScoredRecord<i64>> = Vec::new();
    let report = Rebalancer::new(0.5, 42).rebalance(&mut scored);

    assert_eq!(report.total, 0);
    assert_eq!(report.fraud_after, 0);
    assert!(!report.clamped);
}

#[test]
fn same_seed_and_input_flip_the_same_records() {
    let mut first = scored_batch(500, 200);
    let mut second = scored_batch(500, 200);

    Rebalancer::new(0.1, 1234).rebalance(&mut first);
    Rebalancer::new(0.1, 1234).rebalance(&mut second);

    let flipped_first: Vec<i64> = first
        .iter()
        .filter(|s| s.relabeled)
        .map(|s| s.record)
        .collect();
    let flipped_second: Vec<i64> = second
        .iter()
        .filter(|s| s.relabeled)
        .map(|s| s.record)
        .collect();
    assert_eq!(flipped_first, flipped_second);
    assert!(!flipped_first.is_empty());
}

#[test]
fn different_seeds_flip_different_records() {
    let mut first = scored_batch(500, 200);
    let mut second = scored_batch(500, 200);

    Rebalancer::new(0.1, 1).rebalance(&mut first);
    Rebalancer::new(0.1, 2).rebalance(&mut second);

    let flipped_first: Vec<i64> = first
        .iter()
        .filter(|s| s.relabeled)
        .map(|s| s.record)
        .collect();
    let flipped_second: Vec<i64> = second
        .iter()
        .filter(|s| s.relabeled)
        .map(|s| s.record)
        .collect();
    assert_ne!(flipped_first, flipped_second);
}

#[test]
fn flipped_records_carry_an_annotation() {
    let mut scored = scored_batch(100, 40);
    Rebalancer::new(0.1, 42).rebalance(&mut scored);
    for record in scored.iter().filter(|s| s.relabeled) {
        assert!(!record.fraud_indicator);
        assert_eq!(record.fraud_reason, REASON_RELABELED_CLEAR);
    }

    let mut scored = scored_batch(100, 2);
    Rebalancer::new(0.2, 42).rebalance(&mut scored);
    for record in scored.iter().filter(|s| s.relabeled) {
        assert!(record.fraud_indicator);
        assert_eq!(record.fraud_reason, REASON_RELABELED_FRAUD);
    }
}

#[test]
fn unflipped_records_keep_their_reasons() {
    let mut scored = scored_batch(50, 30);
    Rebalancer::new(0.4, 9).rebalance(&mut scored);

    for record in scored.iter().filter(|s| !s.relabeled) {
        if record.fraud_indicator {
            assert_eq!(record.fraud_reason, "late_report");
        } else {
            assert_eq!(record.fraud_reason, verdict::REASON_NONE);
        }
    }
}
