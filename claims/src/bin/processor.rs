use claims::{
    aggregates::DatasetAggregates, features, rule_catalog, sqlite_storage::SqliteClaimStorage,
};
use processing::{
    executable_utils, expression::ExpressionRules, model::GenericError, processor::BatchProcessor,
    rebalance::Rebalancer, storage::BatchStorage,
};

#[tokio::main]
async fn main() -> Result<(), GenericError> {
    let config = executable_utils::initialize_executable()?;
    executable_utils::init_tracing(&config.processor.log_level);

    let storage = SqliteClaimStorage::new(&config.common.database_url).await?;
    storage.initialize_schema().await?;

    let records = storage.load_records().await?;
    tracing::info!(count = records.len(), "loaded claims for scoring");

    // Aggregates come from one grouping pass; scoring reads them only.
    let aggregates = DatasetAggregates::build(&records, config.scoring.as_of_date);

    let rules = rule_catalog::build_rule_set(&config.scoring)?;
    let expressions = ExpressionRules::compile(&config.scoring.custom_rules)?;
    let processor =
        BatchProcessor::new(rules, expressions, &config.scoring, features::feature_names())?;

    let mut scored = processor.score_batch(records, &aggregates);

    let rebalancer = Rebalancer::new(config.rebalance.target_fraction, config.rebalance.seed);
    let report = rebalancer.rebalance(&mut scored);

    storage.save_scored(&scored).await?;

    tracing::info!(
        total = report.total,
        fraud = report.fraud_after,
        target = report.target,
        upgraded = report.upgraded,
        downgraded = report.downgraded,
        "processing finished"
    );
    Ok(())
}
