//! `nftdrop-infra` — job storage backends and the redemption pipeline.

pub mod job_store;
pub mod redemption;

pub use job_store::{InMemoryJobStore, JobStore, JobStoreError, PostgresJobStore};
pub use redemption::{RedemptionError, RedemptionService};
