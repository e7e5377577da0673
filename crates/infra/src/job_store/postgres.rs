use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use nftdrop_core::{Address, ContractAddress, RedeemCode};
use nftdrop_jobs::AirdropJob;

use super::{JobStore, JobStoreError};

/// Postgres-backed job store.
///
/// Atomicity is delegated to the database: `redeem_atomically` is a single
/// conditional `UPDATE` matching the unredeemed row, so no process-level
/// locking is involved, and the primary key on `redeem_code` enforces the
/// create-once policy. The pool is `Clone`/`Send`/`Sync`, one store instance
/// serves all requests.
pub struct PostgresJobStore {
    pool: PgPool,
}

impl PostgresJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, JobStoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(storage_error)?;
        Ok(Self::new(pool))
    }

    /// Create the backing table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), JobStoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS airdrop_jobs (
                redeem_code      TEXT PRIMARY KEY,
                contract_address TEXT NOT NULL,
                quantity         BIGINT NOT NULL CHECK (quantity > 0),
                redeemed_by      TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }
}

fn storage_error(e: sqlx::Error) -> JobStoreError {
    JobStoreError::Storage(e.to_string())
}

fn row_to_job(row: &PgRow) -> Result<AirdropJob, JobStoreError> {
    let redeem_code: String = row.try_get("redeem_code").map_err(storage_error)?;
    let contract_address: String = row.try_get("contract_address").map_err(storage_error)?;
    let quantity: i64 = row.try_get("quantity").map_err(storage_error)?;
    let redeemed_by: Option<String> = row.try_get("redeemed_by").map_err(storage_error)?;

    let contract_address = ContractAddress::parse(&contract_address)
        .map_err(|e| JobStoreError::Storage(format!("stored contract address: {e}")))?;
    // NULL is the canonical unredeemed marker; an empty string is tolerated
    // as the storage-native sentinel of older rows.
    let redeemed_by = redeemed_by
        .filter(|s| !s.is_empty())
        .map(|s| {
            Address::parse(&s)
                .map_err(|e| JobStoreError::Storage(format!("stored wallet address: {e}")))
        })
        .transpose()?;

    Ok(AirdropJob {
        redeem_code: RedeemCode::new(redeem_code),
        contract_address,
        quantity,
        redeemed_by,
    })
}

#[async_trait]
impl JobStore for PostgresJobStore {
    async fn create(&self, job: AirdropJob) -> Result<(), JobStoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO airdrop_jobs (redeem_code, contract_address, quantity, redeemed_by)
            VALUES ($1, $2, $3, NULL)
            ON CONFLICT (redeem_code) DO NOTHING
            "#,
        )
        .bind(job.redeem_code.as_str())
        .bind(job.contract_address.as_str())
        .bind(job.quantity)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(JobStoreError::AlreadyExists(job.redeem_code));
        }
        Ok(())
    }

    async fn get(&self, code: &RedeemCode) -> Result<Option<AirdropJob>, JobStoreError> {
        let row = sqlx::query(
            r#"
            SELECT redeem_code, contract_address, quantity, redeemed_by
            FROM airdrop_jobs
            WHERE redeem_code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.as_ref().map(row_to_job).transpose()
    }

    async fn list(&self) -> Result<Vec<AirdropJob>, JobStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT redeem_code, contract_address, quantity, redeemed_by
            FROM airdrop_jobs
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter().map(row_to_job).collect()
    }

    async fn update(&self, job: AirdropJob) -> Result<AirdropJob, JobStoreError> {
        let row = sqlx::query(
            r#"
            UPDATE airdrop_jobs
            SET contract_address = $2, quantity = $3, redeemed_by = $4
            WHERE redeem_code = $1
            RETURNING redeem_code, contract_address, quantity, redeemed_by
            "#,
        )
        .bind(job.redeem_code.as_str())
        .bind(job.contract_address.as_str())
        .bind(job.quantity)
        .bind(job.redeemed_by.as_ref().map(|w| w.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some(row) => row_to_job(&row),
            None => Err(JobStoreError::NotFound(job.redeem_code)),
        }
    }

    async fn delete(&self, code: &RedeemCode) -> Result<(), JobStoreError> {
        let result = sqlx::query("DELETE FROM airdrop_jobs WHERE redeem_code = $1")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(JobStoreError::NotFound(code.clone()));
        }
        Ok(())
    }

    async fn redeem_atomically(
        &self,
        code: &RedeemCode,
        wallet: &Address,
    ) -> Result<AirdropJob, JobStoreError> {
        // Single conditional update: the match on the unredeemed sentinel
        // and the write happen in one statement.
        let row = sqlx::query(
            r#"
            UPDATE airdrop_jobs
            SET redeemed_by = $2
            WHERE redeem_code = $1 AND (redeemed_by IS NULL OR redeemed_by = '')
            RETURNING redeem_code, contract_address, quantity, redeemed_by
            "#,
        )
        .bind(code.as_str())
        .bind(wallet.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some(row) => row_to_job(&row),
            None => Err(JobStoreError::NotFoundOrRedeemed(code.clone())),
        }
    }
}
