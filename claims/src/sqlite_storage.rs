use crate::model::ClaimRecord;
use async_trait::async_trait;
use processing::{
    model::{GenericError, ModelId, ScoredRecord},
    storage::BatchStorage,
};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::{debug, info};

/// SQLite-backed store for the unified claims table and the scored output.
/// All writes happen in batch transactions; the pipeline never updates rows
/// incrementally.
pub struct SqliteClaimStorage {
    pool: SqlitePool,
}

impl SqliteClaimStorage {
    pub async fn new(database_url: &str) -> Result<Self, GenericError> {
        let pool = SqlitePool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Scored output rows, for downstream consumers and verification.
    pub async fn load_scored(&self) -> Result<Vec<ScoredRow>, GenericError> {
        let rows = sqlx::query(
            r#"
            SELECT claim_id, fraud_indicator, fraud_reason, relabeled
            FROM scored_claims
            ORDER BY claim_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScoredRow {
                claim_id: row.get("claim_id"),
                fraud_indicator: row.get("fraud_indicator"),
                fraud_reason: row.get("fraud_reason"),
                relabeled: row.get("relabeled"),
            })
            .collect())
    }

    /// The audit trail for one claim: every rule evaluated and its outcome.
    pub async fn load_rule_outcomes(
        &self,
        claim_id: ModelId,
    ) -> Result<Vec<(String, bool)>, GenericError> {
        let rows = sqlx::query(
            r#"
            SELECT rule_name, triggered
            FROM triggered_rules
            WHERE claim_id = ?
            ORDER BY id
            "#,
        )
        .bind(claim_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("rule_name"), row.get("triggered")))
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub claim_id: ModelId,
    pub fraud_indicator: bool,
    pub fraud_reason: String,
    pub relabeled: bool,
}

#[async_trait]
impl BatchStorage<ClaimRecord> for SqliteClaimStorage {
    async fn initialize_schema(&self) -> Result<(), GenericError> {
        let init_sql = include_str!("../resources/init.sql");
        sqlx::raw_sql(init_sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn save_records(&self, records: &[ClaimRecord]) -> Result<(), GenericError> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            debug!(claim_id = record.claim_id, "inserting claim");
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO claims (
                    claim_id, claim_number, occurrence_date, report_date, report_hour,
                    claim_amount, occurrence_state, occurrence_address,
                    status_code, status_reason, status_date, declined_status_count,
                    policy_number, policy_start_date, policy_end_date,
                    policy_premium, policy_claim_limit, risk_level,
                    insured_id, insured_state, claimant_id, claimant_state,
                    claimant_age, claimant_job_title, employment_status,
                    hire_date, disability_begin_date, provider_id, provider_state,
                    injury_type, injury_body_part, injury_severity,
                    treatment_required, days_lost, injury_count,
                    total_payments, payment_count
                ) VALUES (
                    ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                    ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
                )
                "#,
            )
            .bind(record.claim_id)
            .bind(&record.claim_number)
            .bind(record.occurrence_date)
            .bind(record.report_date)
            .bind(record.report_hour)
            .bind(record.claim_amount)
            .bind(&record.occurrence_state)
            .bind(&record.occurrence_address)
            .bind(&record.status_code)
            .bind(&record.status_reason)
            .bind(record.status_date)
            .bind(record.declined_status_count)
            .bind(&record.policy_number)
            .bind(record.policy_start_date)
            .bind(record.policy_end_date)
            .bind(record.policy_premium)
            .bind(record.policy_claim_limit)
            .bind(&record.risk_level)
            .bind(record.insured_id)
            .bind(&record.insured_state)
            .bind(record.claimant_id)
            .bind(&record.claimant_state)
            .bind(record.claimant_age)
            .bind(&record.claimant_job_title)
            .bind(&record.employment_status)
            .bind(record.hire_date)
            .bind(record.disability_begin_date)
            .bind(record.provider_id)
            .bind(&record.provider_state)
            .bind(&record.injury_type)
            .bind(&record.injury_body_part)
            .bind(&record.injury_severity)
            .bind(record.treatment_required)
            .bind(record.days_lost)
            .bind(record.injury_count)
            .bind(record.total_payments)
            .bind(record.payment_count)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(count = records.len(), "saved claim batch");
        Ok(())
    }

    async fn load_records(&self) -> Result<Vec<ClaimRecord>, GenericError> {
        let rows = sqlx::query("SELECT * FROM claims ORDER BY claim_id")
            .fetch_all(&self.pool)
            .await?;

        let records = rows.into_iter().map(claim_from_row).collect();
        Ok(records)
    }

    async fn save_scored(&self, scored: &[ScoredRecord<ClaimRecord>]) -> Result<(), GenericError> {
        let mut tx = self.pool.begin().await?;

        for entry in scored {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO scored_claims (
                    claim_id, fraud_indicator, fraud_reason, relabeled
                ) VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(entry.record.claim_id)
            .bind(entry.fraud_indicator)
            .bind(&entry.fraud_reason)
            .bind(entry.relabeled)
            .execute(&mut *tx)
            .await?;

            // Rewrite the audit rows wholesale; a rescore replaces them.
            sqlx::query("DELETE FROM triggered_rules WHERE claim_id = ?")
                .bind(entry.record.claim_id)
                .execute(&mut *tx)
                .await?;

            for hit in &entry.hits {
                sqlx::query(
                    r#"
                    INSERT INTO triggered_rules (claim_id, rule_name, triggered)
                    VALUES (?, ?, ?)
                    "#,
                )
                .bind(entry.record.claim_id)
                .bind(&hit.rule)
                .bind(hit.triggered)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        info!(count = scored.len(), "saved scored batch");
        Ok(())
    }
}

fn claim_from_row(row: SqliteRow) -> ClaimRecord {
    ClaimRecord {
        claim_id: row.get("claim_id"),
        claim_number: row.get("claim_number"),
        occurrence_date: row.get("occurrence_date"),
        report_date: row.get("report_date"),
        report_hour: row.get("report_hour"),
        claim_amount: row.get("claim_amount"),
        occurrence_state: row.get("occurrence_state"),
        occurrence_address: row.get("occurrence_address"),
        status_code: row.get("status_code"),
        status_reason: row.get("status_reason"),
        status_date: row.get("status_date"),
        declined_status_count: row.get("declined_status_count"),
        policy_number: row.get("policy_number"),
        policy_start_date: row.get("policy_start_date"),
        policy_end_date: row.get("policy_end_date"),
        policy_premium: row.get("policy_premium"),
        policy_claim_limit: row.get("policy_claim_limit"),
        risk_level: row.get("risk_level"),
        insured_id: row.get("insured_id"),
        insured_state: row.get("insured_state"),
        claimant_id: row.get("claimant_id"),
        claimant_state: row.get("claimant_state"),
        claimant_age: row.get("claimant_age"),
        claimant_job_title: row.get("claimant_job_title"),
        employment_status: row.get("employment_status"),
        hire_date: row.get("hire_date"),
        disability_begin_date: row.get("disability_begin_date"),
        provider_id: row.get("provider_id"),
        provider_state: row.get("provider_state"),
        injury_type: row.get("injury_type"),
        injury_body_part: row.get("injury_body_part"),
        injury_severity: row.get("injury_severity"),
        treatment_required: row.get("treatment_required"),
        days_lost: row.get("days_lost"),
        injury_count: row.get("injury_count"),
        total_payments: row.get("total_payments"),
        payment_count: row.get("payment_count"),
    }
}
