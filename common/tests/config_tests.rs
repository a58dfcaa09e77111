use common::config::{AggregationMode, Config};
use std::io::Write;

fn write_config(contents: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    (dir, path.to_string_lossy().into_owned())
}

#[test]
fn minimal_config_gets_defaults() {
    let (_dir, path) = write_config(
        r#"
common:
  project_name: claims
  database_url: sqlite://claims.db
importer:
  input_path: data/unified_claims.ndjson
  log_level: info
processor:
  log_level: info
"#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.common.project_name, "claims");
    assert_eq!(config.scoring.mode, AggregationMode::AnyTrigger);
    assert_eq!(config.scoring.threshold, 3);
    assert_eq!(config.scoring.thresholds.late_report_days, 30);
    assert!((config.rebalance.target_fraction - 0.15).abs() < f64::EPSILON);
    assert_eq!(config.rebalance.seed, 42);
}

#[test]
fn scoring_overrides_are_applied() {
    let (_dir, path) = write_config(
        r#"
common:
  project_name: claims
  database_url: sqlite://claims.db
importer:
  input_path: data/unified_claims.ndjson
  log_level: info
processor:
  log_level: debug
scoring:
  mode: count-threshold
  threshold: 2
  disabled_rules:
    - weekend_occurrence
  thresholds:
    late_report_days: 45
    limit_ratio: 0.8
rebalance:
  target_fraction: 0.3
  seed: 7
"#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.scoring.mode, AggregationMode::CountThreshold);
    assert_eq!(config.scoring.threshold, 2);
    assert_eq!(config.scoring.disabled_rules, vec!["weekend_occurrence"]);
    assert_eq!(config.scoring.thresholds.late_report_days, 45);
    // untouched thresholds keep their defaults
    assert_eq!(config.scoring.thresholds.near_expiry_days, 7);
    assert!((config.scoring.thresholds.limit_ratio - 0.8).abs() < f64::EPSILON);
    assert!((config.rebalance.target_fraction - 0.3).abs() < f64::EPSILON);
    assert_eq!(config.rebalance.seed, 7);
}

#[test]
fn out_of_range_target_fraction_is_rejected() {
    let (_dir, path) = write_config(
        r#"
common:
  project_name: claims
  database_url: sqlite://claims.db
importer:
  input_path: data/unified_claims.ndjson
  log_level: info
processor:
  log_level: info
rebalance:
  target_fraction: 1.5
"#,
    );

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("target_fraction"));
}

#[test]
fn zero_threshold_under_count_mode_is_rejected() {
    let (_dir, path) = write_config(
        r#"
common:
  project_name: claims
  database_url: sqlite://claims.db
importer:
  input_path: data/unified_claims.ndjson
  log_level: info
processor:
  log_level: info
scoring:
  mode: count-threshold
  threshold: 0
"#,
    );

    assert!(Config::load(&path).is_err());
}
