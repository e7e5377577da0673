//! `nftdrop-jobs` — the airdrop job record.

pub mod job;

pub use job::AirdropJob;
