//! Fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Listing, Shop, ShopSelectors, StockStatus};
use crate::fetcher::{FetchOptions, Fetcher, TransportError, TransportErrorKind};

pub(crate) fn shop_url(i: usize) -> String {
    format!("https://shop{i}.example.com")
}

/// A valid shop with id `shop-{i}` and name `상점{i}`, matching [`results_page`].
pub(crate) fn sample_shop(i: usize) -> Shop {
    let mut selectors = ShopSelectors::new(".product", ".name", ".price");
    selectors.product_link = Some(".name".into());
    selectors.stock_status = Some(".stock".into());

    let mut shop = Shop::new(
        format!("상점{i}"),
        shop_url(i),
        format!("{}/search?q={{keyword}}", shop_url(i)),
        selectors,
    );
    shop.id = format!("shop-{i}");
    shop
}

pub(crate) fn listing(
    shop: usize,
    name: &str,
    price: Option<u64>,
    stock_status: StockStatus,
) -> Listing {
    let source = sample_shop(shop);
    let mut listing = Listing::new(source.id, source.name, name);
    listing.price = price;
    listing.price_text = price.map(|p| p.to_string());
    listing.stock_status = stock_status;
    listing.product_url = Some(format!("{}/goods/{name}", shop_url(shop)));
    listing
}

/// A search results page with one `.product` per `(name, price)` pair.
pub(crate) fn results_page(products: &[(&str, &str)]) -> String {
    let items: String = products
        .iter()
        .enumerate()
        .map(|(i, (name, price))| {
            format!(
                r#"<div class="product"><a class="name" href="/goods/{i}">{name}</a><span class="price">{price}</span></div>"#
            )
        })
        .collect();
    format!("<html><body>{items}</body></html>")
}

enum Reply {
    Body(String),
    Fail(TransportErrorKind),
    Panic,
}

struct Script {
    prefix: String,
    delay: Duration,
    reply: Reply,
}

/// In-memory [`Fetcher`] answering by URL prefix and recording every request.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    scripts: Vec<Script>,
    requests: Mutex<Vec<(String, FetchOptions)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn script(mut self, prefix: &str, delay: Duration, reply: Reply) -> Self {
        self.scripts.push(Script {
            prefix: prefix.to_string(),
            delay,
            reply,
        });
        self
    }

    pub(crate) fn respond(self, prefix: &str, body: impl Into<String>) -> Self {
        self.script(prefix, Duration::ZERO, Reply::Body(body.into()))
    }

    pub(crate) fn respond_after(
        self,
        prefix: &str,
        body: impl Into<String>,
        delay: Duration,
    ) -> Self {
        self.script(prefix, delay, Reply::Body(body.into()))
    }

    pub(crate) fn fail(self, prefix: &str, kind: TransportErrorKind) -> Self {
        self.script(prefix, Duration::ZERO, Reply::Fail(kind))
    }

    pub(crate) fn panic_on(self, prefix: &str) -> Self {
        self.script(prefix, Duration::ZERO, Reply::Panic)
    }

    pub(crate) fn requests(&self) -> Vec<(String, FetchOptions)> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self.scripts.iter().find(|s| url.starts_with(&s.prefix));
        if let Some(script) = script {
            if !script.delay.is_zero() {
                tokio::time::sleep(script.delay).await;
            }
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match script.map(|s| &s.reply) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Fail(kind)) => Err(TransportError::new(*kind, format!("scripted failure for {url}"))),
            Some(Reply::Panic) => panic!("scripted panic for {url}"),
            None => Err(TransportError::new(
                TransportErrorKind::Other,
                format!("no scripted response for {url}"),
            )),
        }
    }
}
