use claims::{model::ClaimRecord, sqlite_storage::SqliteClaimStorage};
use processing::{executable_utils, importer, model::GenericError, storage::BatchStorage};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    let config = executable_utils::initialize_executable()?;
    executable_utils::init_tracing(&config.importer.log_level);

    let storage = SqliteClaimStorage::new(&config.common.database_url).await?;
    storage.initialize_schema().await?;

    let input = Path::new(&config.importer.input_path);
    let (records, summary) = importer::read_batch::<ClaimRecord>(input)?;
    storage.save_records(&records).await?;

    tracing::info!(
        accepted = summary.accepted,
        rejected = summary.rejected,
        "import finished"
    );
    Ok(())
}
