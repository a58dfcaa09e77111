use crate::model::{GenericError, Scorable, ScoredRecord};
use async_trait::async_trait;

/// Persistence boundary for a scoring batch. The pipeline writes raw records
/// once at import time and scored output once at the end of a batch; there
/// are no incremental or concurrent writers.
#[async_trait]
pub trait BatchStorage<P: Scorable>: Send + Sync {
    async fn initialize_schema(&self) -> Result<(), GenericError>;

    async fn save_records(&self, records: &[P]) -> Result<(), GenericError>;

    async fn load_records(&self) -> Result<Vec<P>, GenericError>;

    /// Persist the scored batch: indicator, reason, relabel marker and one
    /// audit row per rule evaluation.
    async fn save_scored(&self, scored: &[ScoredRecord<P>]) -> Result<(), GenericError>;
}
