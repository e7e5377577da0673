use serde::{Deserialize, Serialize};

use nftdrop_core::{Address, ContractAddress, RedeemCode};

/// One airdrop allocation: a redeem code bound to a token contract and
/// quantity, pending until a wallet claims it.
///
/// The store owns the authoritative copy of every job; everything else
/// reads and mutates jobs only through store operations. `redeemed_by` is
/// `None` until redemption and transitions to `Some` exactly once through
/// the redemption path; the administrative update may overwrite any field
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirdropJob {
    pub redeem_code: RedeemCode,
    pub contract_address: ContractAddress,
    pub quantity: i64,
    pub redeemed_by: Option<Address>,
}

impl AirdropJob {
    /// Create a pending (unredeemed) job.
    pub fn new(redeem_code: RedeemCode, contract_address: ContractAddress, quantity: i64) -> Self {
        Self {
            redeem_code,
            contract_address,
            quantity,
            redeemed_by: None,
        }
    }

    pub fn is_redeemed(&self) -> bool {
        self.redeemed_by.is_some()
    }
}
