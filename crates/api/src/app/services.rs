use std::sync::Arc;

use nftdrop_infra::job_store::{InMemoryJobStore, PostgresJobStore};
use nftdrop_infra::redemption::RedemptionService;
use nftdrop_transfer::{NftTransfer, NoopTransfer};

/// Process configuration, read from the environment in `main.rs`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    /// When absent, the persistent V2 surface is not mounted.
    pub database_url: Option<String>,
}

/// One redemption service per API version, same pipeline, different store.
pub struct AppServices {
    pub airdrops_v1: Arc<RedemptionService>,
    pub airdrops_v2: Option<Arc<RedemptionService>>,
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let transfer: Arc<dyn NftTransfer> = Arc::new(NoopTransfer::new());

    let airdrops_v1 = Arc::new(RedemptionService::new(
        Arc::new(InMemoryJobStore::new()),
        transfer.clone(),
    ));

    let airdrops_v2 = match &config.database_url {
        Some(url) => {
            let store = PostgresJobStore::connect(url).await?;
            store.ensure_schema().await?;
            Some(Arc::new(RedemptionService::new(Arc::new(store), transfer)))
        }
        None => None,
    };

    Ok(AppServices {
        airdrops_v1,
        airdrops_v2,
    })
}
