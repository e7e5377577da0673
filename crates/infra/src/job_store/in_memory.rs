use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use nftdrop_core::{Address, RedeemCode};
use nftdrop_jobs::AirdropJob;

use super::{JobStore, JobStoreError};

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    jobs: HashMap<RedeemCode, (u64, AirdropJob)>,
}

/// In-memory job store.
///
/// Intended for dev/test and the ephemeral V1 surface. The whole map sits
/// behind one `RwLock`: every mutation (including the check-and-set inside
/// `redeem_atomically`) runs under the exclusive write guard, which is the
/// critical section that keeps two concurrent redemptions of the same code
/// from both succeeding. The per-entry sequence number preserves insertion
/// order for `list`.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    inner: RwLock<Inner>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> JobStoreError {
    JobStoreError::Storage("lock poisoned".to_string())
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: AirdropJob) -> Result<(), JobStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        if inner.jobs.contains_key(&job.redeem_code) {
            return Err(JobStoreError::AlreadyExists(job.redeem_code));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.jobs.insert(job.redeem_code.clone(), (seq, job));
        Ok(())
    }

    async fn get(&self, code: &RedeemCode) -> Result<Option<AirdropJob>, JobStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.jobs.get(code).map(|(_, job)| job.clone()))
    }

    async fn list(&self) -> Result<Vec<AirdropJob>, JobStoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut entries: Vec<_> = inner.jobs.values().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        Ok(entries.into_iter().map(|(_, job)| job.clone()).collect())
    }

    async fn update(&self, job: AirdropJob) -> Result<AirdropJob, JobStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        match inner.jobs.get_mut(&job.redeem_code) {
            Some(entry) => {
                entry.1 = job.clone();
                Ok(job)
            }
            None => Err(JobStoreError::NotFound(job.redeem_code)),
        }
    }

    async fn delete(&self, code: &RedeemCode) -> Result<(), JobStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner
            .jobs
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| JobStoreError::NotFound(code.clone()))
    }

    async fn redeem_atomically(
        &self,
        code: &RedeemCode,
        wallet: &Address,
    ) -> Result<AirdropJob, JobStoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        match inner.jobs.get_mut(code) {
            Some((_, job)) if !job.is_redeemed() => {
                job.redeemed_by = Some(wallet.clone());
                Ok(job.clone())
            }
            // Unknown and already-redeemed collapse into one signal.
            _ => Err(JobStoreError::NotFoundOrRedeemed(code.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nftdrop_core::ContractAddress;

    use super::*;

    const CONTRACT: &str = "0xed5af388653567af2f388e6224dc7c4b3241c544";
    const WALLET: &str = "0x54BE3a794282C030b15E43aE2bB182E14c409C5e";

    fn job(code: &str) -> AirdropJob {
        AirdropJob::new(
            RedeemCode::new(code),
            ContractAddress::parse(CONTRACT).unwrap(),
            10,
        )
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let store = InMemoryJobStore::new();
        store.create(job("code01")).await.unwrap();

        let found = store.get(&RedeemCode::new("code01")).await.unwrap().unwrap();
        assert_eq!(found.quantity, 10);
        assert!(!found.is_redeemed());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_code() {
        let store = InMemoryJobStore::new();
        store.create(job("code01")).await.unwrap();

        assert!(matches!(
            store.create(job("code01")).await,
            Err(JobStoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = InMemoryJobStore::new();
        for code in ["zzzzzz", "aaaaaa", "mmmmmm"] {
            store.create(job(code)).await.unwrap();
        }

        let codes: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.redeem_code.as_str().to_string())
            .collect();
        assert_eq!(codes, ["zzzzzz", "aaaaaa", "mmmmmm"]);
    }

    #[tokio::test]
    async fn update_missing_code_is_not_found_and_creates_nothing() {
        let store = InMemoryJobStore::new();

        assert!(matches!(
            store.update(job("ghost1")).await,
            Err(JobStoreError::NotFound(_))
        ));
        assert!(store.get(&RedeemCode::new("ghost1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let store = InMemoryJobStore::new();
        store.create(job("code01")).await.unwrap();

        let mut replacement = job("code01");
        replacement.quantity = 2;
        replacement.redeemed_by = Some(Address::parse(WALLET).unwrap());
        store.update(replacement).await.unwrap();

        let found = store.get(&RedeemCode::new("code01")).await.unwrap().unwrap();
        assert_eq!(found.quantity, 2);
        assert!(found.is_redeemed());
    }

    #[tokio::test]
    async fn delete_then_get_reports_absent() {
        let store = InMemoryJobStore::new();
        store.create(job("code01")).await.unwrap();

        store.delete(&RedeemCode::new("code01")).await.unwrap();
        assert!(store.get(&RedeemCode::new("code01")).await.unwrap().is_none());

        assert!(matches!(
            store.delete(&RedeemCode::new("code01")).await,
            Err(JobStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn redeem_atomically_claims_once() {
        let store = InMemoryJobStore::new();
        store.create(job("code01")).await.unwrap();
        let code = RedeemCode::new("code01");
        let wallet = Address::parse(WALLET).unwrap();

        let claimed = store.redeem_atomically(&code, &wallet).await.unwrap();
        assert_eq!(claimed.redeemed_by, Some(wallet.clone()));

        assert!(matches!(
            store.redeem_atomically(&code, &wallet).await,
            Err(JobStoreError::NotFoundOrRedeemed(_))
        ));
    }

    #[tokio::test]
    async fn redeem_atomically_unknown_code_is_same_signal() {
        let store = InMemoryJobStore::new();
        let wallet = Address::parse(WALLET).unwrap();

        assert!(matches!(
            store.redeem_atomically(&RedeemCode::new("ghost1"), &wallet).await,
            Err(JobStoreError::NotFoundOrRedeemed(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_redeems_yield_exactly_one_success() {
        let store = Arc::new(InMemoryJobStore::new());
        store.create(job("code01")).await.unwrap();

        let barrier = Arc::new(tokio::sync::Barrier::new(8));
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let barrier = barrier.clone();
            // Distinct wallets so the winner is observable.
            let wallet = Address::parse(&format!("0x{i:040x}")).unwrap();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                store.redeem_atomically(&RedeemCode::new("code01"), &wallet).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let stored = store.get(&RedeemCode::new("code01")).await.unwrap().unwrap();
        assert!(stored.is_redeemed());
    }
}
