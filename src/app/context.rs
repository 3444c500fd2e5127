use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::app::error::{PlapriceError, Result};
use crate::config::Config;
use crate::domain::Shop;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::store::{JsonStore, Store};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<JsonStore>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub aggregator: Aggregator,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(JsonStore::open(config.store_path()?)?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.http)?);
        Ok(Self::with_fetcher(config, store, fetcher))
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(JsonStore::in_memory());
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.http)?);
        Ok(Self::with_fetcher(config, store, fetcher))
    }

    pub fn with_fetcher(
        config: Config,
        store: Arc<JsonStore>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
    ) -> Self {
        let aggregator = Aggregator::with_workers(fetcher.clone(), config.search.workers)
            .with_timeout(config.http.timeout());

        Self {
            config,
            store,
            fetcher,
            aggregator,
        }
    }

    /// Shops a search should cover.
    ///
    /// Explicit ids are looked up as given, disabled shops included, and an
    /// unknown id is an error. Without ids every enabled shop is used.
    pub fn target_shops(&self, ids: &[String]) -> Result<Vec<Shop>> {
        if ids.is_empty() {
            return self.store.list_enabled_shops();
        }

        ids.iter()
            .map(|id| {
                self.store
                    .get_shop(id)?
                    .ok_or_else(|| PlapriceError::ShopNotFound(id.clone()))
            })
            .collect()
    }
}
