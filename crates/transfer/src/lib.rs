//! `nftdrop-transfer` — the on-chain transfer collaborator boundary.
//!
//! The redemption flow needs "move `quantity` tokens from `contract` to
//! `wallet`" and nothing else, so that is the whole trait. Chain plumbing
//! (RPC clients, signing, gas) lives behind implementations of it.

use async_trait::async_trait;
use thiserror::Error;

use nftdrop_core::{Address, ContractAddress};

/// Transfer execution failure.
///
/// The message is surfaced to the redeeming caller unchanged; the job store
/// is never touched on failure (no partial commit, no compensation).
#[derive(Debug, Clone, Error)]
pub enum TransferError {
    /// The transfer was attempted and rejected (insufficient supply, revert,
    /// contract refused).
    #[error("{0}")]
    Rejected(String),

    /// The transfer backend could not be reached.
    #[error("transfer backend unavailable: {0}")]
    Unavailable(String),
}

/// Executes the NFT transfer behind a redemption.
#[async_trait]
pub trait NftTransfer: Send + Sync {
    /// Transfer `quantity` tokens of `contract` to `wallet`.
    ///
    /// Implementations must be all-or-nothing from the caller's point of
    /// view: on `Err` no tokens moved.
    async fn transfer(
        &self,
        contract: &ContractAddress,
        wallet: &Address,
        quantity: i64,
    ) -> Result<(), TransferError>;
}

#[async_trait]
impl<T> NftTransfer for std::sync::Arc<T>
where
    T: NftTransfer + ?Sized,
{
    async fn transfer(
        &self,
        contract: &ContractAddress,
        wallet: &Address,
        quantity: i64,
    ) -> Result<(), TransferError> {
        (**self).transfer(contract, wallet, quantity).await
    }
}

/// Dev/test executor: logs the transfer and reports success.
#[derive(Debug, Default)]
pub struct NoopTransfer;

impl NoopTransfer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NftTransfer for NoopTransfer {
    async fn transfer(
        &self,
        contract: &ContractAddress,
        wallet: &Address,
        quantity: i64,
    ) -> Result<(), TransferError> {
        tracing::info!(%contract, %wallet, quantity, "executing NFT transfer (noop)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_transfer_succeeds() {
        let contract = ContractAddress::parse("0xed5af388653567af2f388e6224dc7c4b3241c544").unwrap();
        let wallet = Address::parse("0x54BE3a794282C030b15E43aE2bB182E14c409C5e").unwrap();
        assert!(NoopTransfer::new().transfer(&contract, &wallet, 3).await.is_ok());
    }
}
