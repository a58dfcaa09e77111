use crate::model::GenericError;
use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::{info, warn};

/// A record the importer can accept. Validation runs once per record before
/// anything is persisted; scoring later assumes these invariants hold.
pub trait Importable: Send + Sync {
    fn validate(&self) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub accepted: usize,
    pub rejected: usize,
}

/// Read a newline-delimited JSON file, one record per line. Malformed lines
/// and records failing validation are logged and dropped; an unreadable file
/// is an error.
pub fn read_batch<I>(path: &Path) -> Result<(Vec<I>, ImportSummary), GenericError>
where
    I: Importable + DeserializeOwned,
{
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut rejected = 0;

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<I>(&line) {
            Ok(record) => match record.validate() {
                Ok(()) => records.push(record),
                Err(reason) => {
                    warn!(line = line_index + 1, %reason, "rejecting record");
                    rejected += 1;
                }
            },
            Err(e) => {
                warn!(line = line_index + 1, error = %e, "skipping malformed line");
                rejected += 1;
            }
        }
    }

    let summary = ImportSummary {
        accepted: records.len(),
        rejected,
    };
    info!(path = %path.display(), accepted = summary.accepted, rejected = summary.rejected, "read import batch");

    Ok((records, summary))
}
