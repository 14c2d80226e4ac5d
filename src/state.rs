use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::ResultCache;
use crate::clients::{CompaniesHouseClient, RegistryClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{DbSnapshotStore, ExportService, SearchService, SnapshotStore};

/// Build a shared HTTP client with reasonable defaults for registry
/// calls. Reused by every upstream request so connections pool instead of
/// exhausting sockets.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("regscout/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Every collaborator the request handlers need, wired once at startup.
/// Services receive their dependencies here rather than reaching for
/// process-wide singletons, so tests can substitute doubles.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub registry: Arc<dyn RegistryClient>,

    pub cache: Arc<ResultCache>,

    pub search_service: Arc<SearchService>,

    pub export_service: Arc<ExportService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.registry.timeout_seconds)?;
        let registry: Arc<dyn RegistryClient> =
            Arc::new(CompaniesHouseClient::new(&config.registry, http_client));
        Self::with_registry(config, registry).await
    }

    /// Same wiring with a caller-supplied registry client; integration
    /// tests use this to run the full stack against a mock upstream.
    pub async fn with_registry(
        config: Config,
        registry: Arc<dyn RegistryClient>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let cache = Arc::new(ResultCache::new(Some(store.clone())));
        let snapshots: Arc<dyn SnapshotStore> = Arc::new(DbSnapshotStore::new(store.clone()));

        let search_service = Arc::new(SearchService::new(
            registry.clone(),
            cache.clone(),
            snapshots.clone(),
            config.search.clone(),
        ));
        let export_service = Arc::new(ExportService::new(snapshots));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            registry,
            cache,
            search_service,
            export_service,
        })
    }
}
