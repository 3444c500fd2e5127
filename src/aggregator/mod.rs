//! Concurrent multi-shop search.
//!
//! Every shop is crawled in its own task, bounded by a semaphore. A shop that
//! fails only contributes a [`CrawlError`]; the other shops' listings are
//! still returned.

pub mod views;

pub use views::{find_lowest_price, sort_by_price};

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::{Listing, Shop, ValidationError};
use crate::extractor::{ExtractError, ListingExtractor};
use crate::fetcher::{FetchOptions, Fetcher, TransportError, DEFAULT_TIMEOUT};

pub const DEFAULT_WORKERS: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("could not build search URL: {0}")]
    SearchUrl(ValidationError),

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error("crawl task aborted: {0}")]
    Aborted(String),
}

/// A single shop's failure during a search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("crawl failed: {shop_name} - {cause}")]
pub struct CrawlError {
    pub shop_id: String,
    pub shop_name: String,
    #[source]
    pub cause: CrawlFailure,
}

impl CrawlError {
    pub fn new(shop: &Shop, cause: impl Into<CrawlFailure>) -> Self {
        Self {
            shop_id: shop.id.clone(),
            shop_name: shop.name.clone(),
            cause: cause.into(),
        }
    }
}

/// Merged result of one search across shops.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Shop order first, then document order within a shop.
    pub listings: Vec<Listing>,
    pub errors: Vec<CrawlError>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn sorted_by_price(&self) -> Vec<Listing> {
        sort_by_price(&self.listings)
    }

    pub fn lowest_price(&self, exclude_out_of_stock: bool) -> Option<&Listing> {
        find_lowest_price(&self.listings, exclude_out_of_stock)
    }
}

pub struct Aggregator {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Search every shop for `keyword` and wait for all of them.
    pub async fn search(&self, shops: &[Shop], keyword: &str) -> SearchOutcome {
        let handles = self.spawn_crawls(shops, keyword);
        collect(shops, handles).await
    }

    /// Like [`search`](Self::search), but gives up as soon as `cancel` fires.
    ///
    /// Returns `None` when cancelled. Outstanding crawls are aborted and
    /// results that already arrived are dropped.
    pub async fn search_until_cancelled(
        &self,
        shops: &[Shop],
        keyword: &str,
        cancel: &CancellationToken,
    ) -> Option<SearchOutcome> {
        if cancel.is_cancelled() {
            return None;
        }

        let handles = self.spawn_crawls(shops, keyword);
        let aborts: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                for abort in aborts {
                    abort.abort();
                }
                tracing::info!("Search for '{}' cancelled", keyword);
                None
            }
            outcome = collect(shops, handles) => Some(outcome),
        }
    }

    fn spawn_crawls(
        &self,
        shops: &[Shop],
        keyword: &str,
    ) -> Vec<JoinHandle<Result<Vec<Listing>, CrawlError>>> {
        shops
            .iter()
            .map(|shop| {
                let fetcher = self.fetcher.clone();
                let semaphore = self.semaphore.clone();
                let shop = shop.clone();
                let keyword = keyword.to_string();
                let timeout = self.timeout;

                tokio::spawn(async move {
                    let _permit = semaphore.acquire().await;
                    crawl_shop(fetcher.as_ref(), &shop, &keyword, timeout).await
                })
            })
            .collect()
    }
}

async fn collect(
    shops: &[Shop],
    handles: Vec<JoinHandle<Result<Vec<Listing>, CrawlError>>>,
) -> SearchOutcome {
    let mut outcome = SearchOutcome::default();

    for (shop, joined) in shops.iter().zip(join_all(handles).await) {
        let result = joined
            .map_err(|e| CrawlError::new(shop, CrawlFailure::Aborted(e.to_string())))
            .and_then(|result| result);

        match result {
            Ok(listings) => outcome.listings.extend(listings),
            Err(e) => {
                tracing::warn!("{}", e);
                outcome.errors.push(e);
            }
        }
    }

    tracing::info!(
        "Search finished: {} listings from {} shops, {} failed",
        outcome.listings.len(),
        shops.len(),
        outcome.errors.len()
    );
    outcome
}

/// Fetch one shop's results page for `keyword` and extract its listings.
pub async fn crawl_shop(
    fetcher: &(dyn Fetcher + Send + Sync),
    shop: &Shop,
    keyword: &str,
    timeout: Duration,
) -> Result<Vec<Listing>, CrawlError> {
    let extractor = ListingExtractor::new(shop).map_err(|e| CrawlError::new(shop, e))?;
    let url = shop
        .search_url(keyword)
        .map_err(|e| CrawlError::new(shop, CrawlFailure::SearchUrl(e)))?;

    let options = FetchOptions {
        timeout,
        verify_tls: shop.verify_ssl,
        encoding: shop.keyword_encoding.clone(),
    };
    let body = fetcher
        .fetch(&url, &options)
        .await
        .map_err(|e| CrawlError::new(shop, e))?;

    Ok(extractor.extract(&body))
}
