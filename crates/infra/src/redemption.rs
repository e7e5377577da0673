//! Redemption pipeline (application-level orchestration).
//!
//! `RedemptionService` coordinates the full lifecycle of an airdrop job:
//! issuing a code, the read-check-transfer-commit sequence of a redemption,
//! and the privileged administrative mutations. It composes the [`JobStore`]
//! and [`NftTransfer`] traits, so the same pipeline runs against the
//! in-memory and the Postgres backend.
//!
//! ## Redemption flow
//!
//! ```text
//! redeem(code, wallet)
//!   1. validate wallet format
//!   2. read the job (precise not-found / already-redeemed answer)
//!   3. execute the NFT transfer
//!   4. commit via the store's atomic claim
//! ```
//!
//! The commit runs only after the transfer succeeded; a transfer failure
//! leaves the record untouched and surfaces the collaborator's message
//! unchanged. Two racing redeems can both pass step 2, but step 4 admits
//! exactly one winner; the loser fails with the unified
//! not-found-or-redeemed signal.

use std::sync::Arc;

use thiserror::Error;

use nftdrop_core::{Address, ContractAddress, RedeemCode};
use nftdrop_jobs::AirdropJob;
use nftdrop_transfer::NftTransfer;

use crate::job_store::{JobStore, JobStoreError};

/// Redemption pipeline error. `Display` strings are user-facing.
#[derive(Debug, Error)]
pub enum RedemptionError {
    #[error("Invalid NFT contract")]
    InvalidContract,

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("Invalid wallet address")]
    InvalidWallet,

    #[error("Airdrop job not found")]
    NotFound,

    #[error("Airdrop job already redeemed")]
    AlreadyRedeemed,

    /// Commit-time signal: the code vanished or a concurrent redeem won.
    #[error("Airdrop job not found or has been redeemed")]
    NotFoundOrRedeemed,

    /// Transfer collaborator failure, message passed through unchanged.
    #[error("{0}")]
    Transfer(String),

    #[error("storage error: {0}")]
    Store(String),
}

impl From<JobStoreError> for RedemptionError {
    fn from(value: JobStoreError) -> Self {
        match value {
            JobStoreError::NotFound(_) => RedemptionError::NotFound,
            JobStoreError::NotFoundOrRedeemed(_) => RedemptionError::NotFoundOrRedeemed,
            JobStoreError::AlreadyExists(code) => {
                RedemptionError::Store(format!("duplicate redeem code: {code}"))
            }
            JobStoreError::Storage(msg) => RedemptionError::Store(msg),
        }
    }
}

/// Coordinates code issuance and redemption against an injected job store
/// and transfer executor.
pub struct RedemptionService {
    store: Arc<dyn JobStore>,
    transfer: Arc<dyn NftTransfer>,
}

impl RedemptionService {
    /// Attempts at drawing an unused code before giving up.
    const MAX_CODE_ATTEMPTS: usize = 3;

    pub fn new(store: Arc<dyn JobStore>, transfer: Arc<dyn NftTransfer>) -> Self {
        Self { store, transfer }
    }

    /// Issue a new airdrop job with a fresh redeem code.
    ///
    /// `quantity` is `None` when the caller supplied a non-numeric value;
    /// it must be a positive integer. The code is re-drawn (bounded) when
    /// the store reports a collision.
    pub async fn generate(
        &self,
        quantity: Option<i64>,
        contract_address: &str,
    ) -> Result<AirdropJob, RedemptionError> {
        let contract = ContractAddress::parse(contract_address)
            .map_err(|_| RedemptionError::InvalidContract)?;
        let quantity = match quantity {
            Some(q) if q > 0 => q,
            _ => return Err(RedemptionError::InvalidQuantity),
        };

        for _ in 0..Self::MAX_CODE_ATTEMPTS {
            let code = RedeemCode::generate(RedeemCode::LENGTH);
            let job = AirdropJob::new(code, contract.clone(), quantity);
            match self.store.create(job.clone()).await {
                Ok(()) => {
                    tracing::info!(code = %job.redeem_code, quantity, "airdrop job created");
                    return Ok(job);
                }
                Err(JobStoreError::AlreadyExists(code)) => {
                    tracing::warn!(%code, "redeem code collision, redrawing");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RedemptionError::Store(
            "could not draw an unused redeem code".to_string(),
        ))
    }

    /// Redeem a code against a wallet, triggering the on-chain transfer.
    pub async fn redeem(
        &self,
        code: &str,
        wallet_address: &str,
    ) -> Result<AirdropJob, RedemptionError> {
        let wallet =
            Address::parse(wallet_address).map_err(|_| RedemptionError::InvalidWallet)?;
        let code = RedeemCode::new(code);

        // Early read: precise user-facing answer, and no transfer is even
        // attempted for an unknown or spent code.
        let job = self
            .store
            .get(&code)
            .await?
            .ok_or(RedemptionError::NotFound)?;
        if job.is_redeemed() {
            return Err(RedemptionError::AlreadyRedeemed);
        }

        self.transfer
            .transfer(&job.contract_address, &wallet, job.quantity)
            .await
            .map_err(|e| RedemptionError::Transfer(e.to_string()))?;

        // Commit only now; a concurrent winner makes this fail without
        // touching the record.
        let redeemed = self.store.redeem_atomically(&code, &wallet).await?;
        tracing::info!(%code, wallet = %wallet, "airdrop job redeemed");
        Ok(redeemed)
    }

    /// Privileged full replace of a job's mutable fields.
    ///
    /// Bypasses the redemption guard: `redeemed_by` may be set, changed, or
    /// cleared directly.
    pub async fn admin_update(
        &self,
        code: &str,
        quantity: Option<i64>,
        contract_address: &str,
        redeemed_by: Option<&str>,
    ) -> Result<AirdropJob, RedemptionError> {
        let contract = ContractAddress::parse(contract_address)
            .map_err(|_| RedemptionError::InvalidContract)?;
        let quantity = match quantity {
            Some(q) if q > 0 => q,
            _ => return Err(RedemptionError::InvalidQuantity),
        };
        let redeemed_by = redeemed_by
            .map(|s| Address::parse(s).map_err(|_| RedemptionError::InvalidWallet))
            .transpose()?;

        let job = AirdropJob {
            redeem_code: RedeemCode::new(code),
            contract_address: contract,
            quantity,
            redeemed_by,
        };
        let updated = self.store.update(job).await?;
        tracing::info!(code = %updated.redeem_code, "airdrop job updated");
        Ok(updated)
    }

    /// Privileged delete.
    pub async fn admin_delete(&self, code: &str) -> Result<(), RedemptionError> {
        self.store.delete(&RedeemCode::new(code)).await?;
        tracing::info!(%code, "airdrop job deleted");
        Ok(())
    }

    /// Point lookup used by the HTTP layer.
    pub async fn get(&self, code: &str) -> Result<AirdropJob, RedemptionError> {
        self.store
            .get(&RedeemCode::new(code))
            .await?
            .ok_or(RedemptionError::NotFound)
    }

    /// All jobs, backend-native order.
    pub async fn list(&self) -> Result<Vec<AirdropJob>, RedemptionError> {
        Ok(self.store.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use nftdrop_transfer::TransferError;

    use crate::job_store::InMemoryJobStore;

    use super::*;

    const CONTRACT: &str = "0xed5af388653567af2f388e6224dc7c4b3241c544";
    const WALLET: &str = "0x54BE3a794282C030b15E43aE2bB182E14c409C5e";

    /// Counts invocations; optionally fails every call.
    struct RecordingTransfer {
        calls: AtomicUsize,
        failure: Option<String>,
    }

    impl RecordingTransfer {
        fn succeeding() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failure: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failure: Some(message.to_string()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NftTransfer for RecordingTransfer {
        async fn transfer(
            &self,
            _contract: &ContractAddress,
            _wallet: &Address,
            _quantity: i64,
        ) -> Result<(), TransferError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.failure {
                Some(msg) => Err(TransferError::Rejected(msg.clone())),
                None => Ok(()),
            }
        }
    }

    fn service(transfer: Arc<RecordingTransfer>) -> (RedemptionService, Arc<InMemoryJobStore>) {
        let store = Arc::new(InMemoryJobStore::new());
        (
            RedemptionService::new(store.clone(), transfer),
            store,
        )
    }

    #[tokio::test]
    async fn generate_creates_a_pending_job() {
        let (svc, _) = service(Arc::new(RecordingTransfer::succeeding()));

        let job = svc.generate(Some(10), CONTRACT).await.unwrap();
        assert_eq!(job.redeem_code.as_str().len(), RedeemCode::LENGTH);
        assert_eq!(job.quantity, 10);
        assert!(!job.is_redeemed());

        let fetched = svc.get(job.redeem_code.as_str()).await.unwrap();
        assert_eq!(fetched, job);
    }

    #[tokio::test]
    async fn generate_rejects_invalid_contract_without_creating() {
        let (svc, store) = service(Arc::new(RecordingTransfer::succeeding()));

        assert!(matches!(
            svc.generate(Some(10), "0xContractAddress").await,
            Err(RedemptionError::InvalidContract)
        ));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn generate_rejects_non_positive_or_non_numeric_quantity() {
        let (svc, store) = service(Arc::new(RecordingTransfer::succeeding()));

        for quantity in [Some(0), Some(-3), None] {
            assert!(matches!(
                svc.generate(quantity, CONTRACT).await,
                Err(RedemptionError::InvalidQuantity)
            ));
        }
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn redeem_commits_after_transfer() {
        let transfer = Arc::new(RecordingTransfer::succeeding());
        let (svc, store) = service(transfer.clone());
        let job = svc.generate(Some(5), CONTRACT).await.unwrap();

        let redeemed = svc.redeem(job.redeem_code.as_str(), WALLET).await.unwrap();
        assert_eq!(redeemed.redeemed_by, Some(Address::parse(WALLET).unwrap()));
        assert_eq!(transfer.calls(), 1);

        let stored = store.get(&job.redeem_code).await.unwrap().unwrap();
        assert!(stored.is_redeemed());
    }

    #[tokio::test]
    async fn redeem_unknown_code_is_not_found() {
        let (svc, _) = service(Arc::new(RecordingTransfer::succeeding()));

        assert!(matches!(
            svc.redeem("ghost1", WALLET).await,
            Err(RedemptionError::NotFound)
        ));
    }

    #[tokio::test]
    async fn second_redeem_fails_without_reinvoking_transfer() {
        let transfer = Arc::new(RecordingTransfer::succeeding());
        let (svc, _) = service(transfer.clone());
        let job = svc.generate(Some(1), CONTRACT).await.unwrap();

        svc.redeem(job.redeem_code.as_str(), WALLET).await.unwrap();
        let second = svc
            .redeem(
                job.redeem_code.as_str(),
                "0x0000000000000000000000000000000000000001",
            )
            .await;

        assert!(matches!(second, Err(RedemptionError::AlreadyRedeemed)));
        assert_eq!(transfer.calls(), 1);

        // The winning wallet is untouched by the failed attempt.
        let stored = svc.get(job.redeem_code.as_str()).await.unwrap();
        assert_eq!(stored.redeemed_by, Some(Address::parse(WALLET).unwrap()));
    }

    #[tokio::test]
    async fn failed_transfer_leaves_record_unredeemed() {
        let transfer = Arc::new(RecordingTransfer::failing("chain unavailable"));
        let (svc, store) = service(transfer.clone());
        let job = svc.generate(Some(2), CONTRACT).await.unwrap();

        let result = svc.redeem(job.redeem_code.as_str(), WALLET).await;
        match result {
            Err(RedemptionError::Transfer(msg)) => assert_eq!(msg, "chain unavailable"),
            other => panic!("expected transfer failure, got {other:?}"),
        }

        let stored = store.get(&job.redeem_code).await.unwrap().unwrap();
        assert!(!stored.is_redeemed());
    }

    #[tokio::test]
    async fn rejects_malformed_wallet_before_any_lookup() {
        let (svc, _) = service(Arc::new(RecordingTransfer::succeeding()));

        assert!(matches!(
            svc.redeem("code01", "0xInvalid").await,
            Err(RedemptionError::InvalidWallet)
        ));
    }

    #[tokio::test]
    async fn admin_update_missing_code_is_not_found() {
        let (svc, store) = service(Arc::new(RecordingTransfer::succeeding()));

        assert!(matches!(
            svc.admin_update("ghost1", Some(2), CONTRACT, None).await,
            Err(RedemptionError::NotFound)
        ));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_update_overwrites_the_redemption_guard() {
        let (svc, _) = service(Arc::new(RecordingTransfer::succeeding()));
        let job = svc.generate(Some(1), CONTRACT).await.unwrap();

        let updated = svc
            .admin_update(job.redeem_code.as_str(), Some(7), CONTRACT, Some(WALLET))
            .await
            .unwrap();
        assert_eq!(updated.quantity, 7);
        assert_eq!(updated.redeemed_by, Some(Address::parse(WALLET).unwrap()));

        // And back to pending, which the redemption path can never do.
        let cleared = svc
            .admin_update(job.redeem_code.as_str(), Some(7), CONTRACT, None)
            .await
            .unwrap();
        assert!(!cleared.is_redeemed());
    }

    #[tokio::test]
    async fn admin_delete_then_get_reports_absent() {
        let (svc, _) = service(Arc::new(RecordingTransfer::succeeding()));
        let job = svc.generate(Some(1), CONTRACT).await.unwrap();

        svc.admin_delete(job.redeem_code.as_str()).await.unwrap();
        assert!(matches!(
            svc.get(job.redeem_code.as_str()).await,
            Err(RedemptionError::NotFound)
        ));
        assert!(matches!(
            svc.admin_delete(job.redeem_code.as_str()).await,
            Err(RedemptionError::NotFound)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_redeems_admit_one_winner() {
        let transfer = Arc::new(RecordingTransfer::succeeding());
        let (svc, _) = service(transfer.clone());
        let svc = Arc::new(svc);
        let job = svc.generate(Some(1), CONTRACT).await.unwrap();

        let barrier = Arc::new(tokio::sync::Barrier::new(6));
        let mut handles = Vec::new();
        for i in 0..6 {
            let svc = svc.clone();
            let barrier = barrier.clone();
            let code = job.redeem_code.as_str().to_string();
            let wallet = format!("0x{i:040x}");
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                svc.redeem(&code, &wallet).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(
                    RedemptionError::AlreadyRedeemed | RedemptionError::NotFoundOrRedeemed,
                ) => {}
                Err(other) => panic!("unexpected failure: {other:?}"),
            }
        }
        assert_eq!(successes, 1);
    }
}
