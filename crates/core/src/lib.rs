//! `nftdrop-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod address;
pub mod error;
pub mod redeem_code;

pub use address::{Address, ContractAddress};
pub use error::{DomainError, DomainResult};
pub use redeem_code::RedeemCode;
