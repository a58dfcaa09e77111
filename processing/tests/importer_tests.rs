use processing::importer::{self, Importable};
use serde::Deserialize;
use std::io::Write;

#[derive(Debug, Deserialize)]
struct TestRecord {
    id: i64,
    amount: f64,
}

impl Importable for TestRecord {
    fn validate(&self) -> Result<(), String> {
        if self.id <= 0 {
            return Err("id must be positive".to_string());
        }
        if self.amount < 0.0 {
            return Err("amount must be non-negative".to_string());
        }
        Ok(())
    }
}

fn write_ndjson(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.ndjson");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}

#[test]
fn reads_valid_lines_and_drops_bad_ones() {
    let (_dir, path) = write_ndjson(
        r#"{"id": 1, "amount": 100.0}
{"id": 2, "amount": 250.5}
not json at all
{"id": -1, "amount": 10.0}
{"id": 3, "amount": -5.0}

{"id": 4, "amount": 0.0}
"#,
    );

    let (records, summary) = importer::read_batch::<TestRecord>(&path).unwrap();
    assert_eq!(summary.accepted, 3);
    assert_eq!(summary.rejected, 3);
    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 4]);
}

#[test]
fn empty_file_yields_empty_batch() {
    let (_dir, path) = write_ndjson("");
    let (records, summary) = importer::read_batch::<TestRecord>(&path).unwrap();
    assert!(records.is_empty());
    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.rejected, 0);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does_not_exist.ndjson");
    assert!(importer::read_batch::<TestRecord>(&path).is_err());
}
