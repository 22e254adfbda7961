//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    cache::{MemoryCache, TtlCache},
    config::Config,
    error::Result,
    resources::ip::IpDetails,
    store::{DataStore, Datasets, JsonDirSource},
};

/// Application state shared across handlers
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: DataStore,
    ip_cache: Arc<dyn TtlCache<IpDetails>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state around an already loaded store, with an in-process IP cache
    pub fn new(config: Config, store: DataStore) -> Self {
        Self {
            config: Arc::new(config),
            store,
            ip_cache: Arc::new(MemoryCache::<IpDetails>::new()),
        }
    }

    /// Load every dataset from `config.data.dir`
    pub async fn load(config: Config) -> Result<Self> {
        let source = Arc::new(JsonDirSource::new(config.data.dir.clone()));
        tracing::info!(dir = %config.data.dir.display(), "Loading datasets");
        let store = DataStore::load(source).await?;
        Ok(Self::new(config, store))
    }

    /// Replace the IP lookup cache
    #[must_use]
    pub fn with_ip_cache(mut self, cache: Arc<dyn TtlCache<IpDetails>>) -> Self {
        self.ip_cache = cache;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the dataset store
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Current dataset snapshot
    pub async fn datasets(&self) -> Arc<Datasets> {
        self.store.snapshot().await
    }

    /// Cache for IP lookups
    pub fn ip_cache(&self) -> &Arc<dyn TtlCache<IpDetails>> {
        &self.ip_cache
    }
}
