//! Keyed storage for airdrop jobs.
//!
//! One contract, two backends: [`InMemoryJobStore`] (single-process,
//! non-persistent, dev/test) and [`PostgresJobStore`] (persistent). Both
//! must show identical observable behavior; the shared contract test suite
//! in `tests/store_contract.rs` runs against each.

use async_trait::async_trait;
use thiserror::Error;

use nftdrop_core::{Address, RedeemCode};
use nftdrop_jobs::AirdropJob;

mod in_memory;
mod postgres;

pub use in_memory::InMemoryJobStore;
pub use postgres::PostgresJobStore;

/// Job store operation error.
#[derive(Debug, Clone, Error)]
pub enum JobStoreError {
    /// A job with this code already exists (create is reject-on-duplicate).
    #[error("airdrop job already exists: {0}")]
    AlreadyExists(RedeemCode),

    /// No job with this code.
    #[error("airdrop job not found: {0}")]
    NotFound(RedeemCode),

    /// The code is unknown **or** the job was already redeemed; the two
    /// causes are reported as one so a check-then-set caller cannot
    /// double-redeem under concurrency.
    #[error("airdrop job not found or has been redeemed: {0}")]
    NotFoundOrRedeemed(RedeemCode),

    /// Backend failure (pool, connection, lock).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Authoritative collection of airdrop jobs.
///
/// ## Contract
///
/// - `create` rejects duplicate codes; there is exactly one job per code at
///   any time.
/// - `redeem_atomically` is the only operation with a true atomicity
///   guarantee: match-unredeemed and set-wallet happen in one step, so
///   concurrent redeems of the same code yield exactly one success.
/// - Reads never observe a torn write.
/// - `list` order is backend-native: insertion order in memory, storage
///   order in Postgres.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job. Fails with `AlreadyExists` if the code is taken.
    async fn create(&self, job: AirdropJob) -> Result<(), JobStoreError>;

    /// Point lookup by code. No side effects.
    async fn get(&self, code: &RedeemCode) -> Result<Option<AirdropJob>, JobStoreError>;

    /// All stored jobs.
    async fn list(&self) -> Result<Vec<AirdropJob>, JobStoreError>;

    /// Full-field replace of the job keyed by `job.redeem_code`.
    ///
    /// Fails with `NotFound` if absent; never creates a record.
    async fn update(&self, job: AirdropJob) -> Result<AirdropJob, JobStoreError>;

    /// Remove the job. Fails with `NotFound` if absent.
    async fn delete(&self, code: &RedeemCode) -> Result<(), JobStoreError>;

    /// Atomically claim a pending job: locate the record matching `code`
    /// whose `redeemed_by` is unset and set it to `wallet` in the same
    /// step. Fails with `NotFoundOrRedeemed` when no such record exists.
    async fn redeem_atomically(
        &self,
        code: &RedeemCode,
        wallet: &Address,
    ) -> Result<AirdropJob, JobStoreError>;
}

#[async_trait]
impl<S> JobStore for std::sync::Arc<S>
where
    S: JobStore + ?Sized,
{
    async fn create(&self, job: AirdropJob) -> Result<(), JobStoreError> {
        (**self).create(job).await
    }

    async fn get(&self, code: &RedeemCode) -> Result<Option<AirdropJob>, JobStoreError> {
        (**self).get(code).await
    }

    async fn list(&self) -> Result<Vec<AirdropJob>, JobStoreError> {
        (**self).list().await
    }

    async fn update(&self, job: AirdropJob) -> Result<AirdropJob, JobStoreError> {
        (**self).update(job).await
    }

    async fn delete(&self, code: &RedeemCode) -> Result<(), JobStoreError> {
        (**self).delete(code).await
    }

    async fn redeem_atomically(
        &self,
        code: &RedeemCode,
        wallet: &Address,
    ) -> Result<AirdropJob, JobStoreError> {
        (**self).redeem_atomically(code, wallet).await
    }
}
