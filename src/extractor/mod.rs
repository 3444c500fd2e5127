pub mod price;
pub mod rules;
pub mod stock;

use scraper::{ElementRef, Html};
use thiserror::Error;
use url::Url;

use crate::domain::{Listing, Shop, StockPatterns, StockStatus};

pub use price::parse_price;
pub use rules::{ExtractionRules, NodeSelector, PriceSelector, SELF_SELECTOR};
pub use stock::{classify_stock_text, has_sold_out_image, is_pre_order_name};

use rules::select_descendants;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid {field} selector '{selector}': {reason}")]
    InvalidSelector {
        field: &'static str,
        selector: String,
        reason: String,
    },

    #[error("invalid base URL '{url}': {reason}")]
    BaseUrl { url: String, reason: String },
}

/// Turns a shop's search results page into listings.
///
/// Built once per shop per search. A container that yields no usable name
/// is skipped; nothing else about a single listing can fail the page.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    shop_id: String,
    shop_name: String,
    base_url: Url,
    rules: ExtractionRules,
    stock_patterns: Option<StockPatterns>,
}

impl ListingExtractor {
    pub fn new(shop: &Shop) -> Result<Self, ExtractError> {
        let base_url = Url::parse(&shop.base_url).map_err(|e| ExtractError::BaseUrl {
            url: shop.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            shop_id: shop.id.clone(),
            shop_name: shop.name.clone(),
            base_url,
            rules: ExtractionRules::compile(&shop.selectors)?,
            stock_patterns: shop.stock_patterns.clone(),
        })
    }

    /// Extract listings in document order.
    pub fn extract(&self, html: &str) -> Vec<Listing> {
        let document = Html::parse_document(html);
        let listings: Vec<Listing> = document
            .select(&self.rules.container)
            .filter_map(|container| self.extract_listing(container))
            .collect();

        tracing::debug!(
            "Extracted {} listings from {}",
            listings.len(),
            self.shop_name
        );
        listings
    }

    fn extract_listing(&self, container: ElementRef<'_>) -> Option<Listing> {
        let product_name = self
            .rules
            .name
            .resolve(container)
            .map(element_text)
            .filter(|name| !name.is_empty())?;

        let (price, price_text) = self.extract_price(container);
        let stock_status = self.extract_stock(container, &product_name);
        let product_url = self.extract_link(container);

        Some(Listing {
            price,
            price_text,
            stock_status,
            product_url,
            ..Listing::new(&self.shop_id, &self.shop_name, product_name)
        })
    }

    fn extract_price(&self, container: ElementRef<'_>) -> (Option<u64>, Option<String>) {
        let mut found = (None, None);

        match &self.rules.price {
            PriceSelector::Sibling(hops) => {
                let base = if container.value().name() == "a" {
                    container
                        .ancestors()
                        .filter_map(ElementRef::wrap)
                        .find(|el| el.value().name() == "td")
                        .unwrap_or(container)
                } else {
                    container
                };

                let sibling = base
                    .next_siblings()
                    .filter_map(ElementRef::wrap)
                    .nth(hops.saturating_sub(1));
                if let Some(node) = sibling {
                    apply_price(&mut found, element_text(node));
                }
            }
            // Every match is tried; the last parseable one wins.
            PriceSelector::Descendant(selector) => {
                for node in select_descendants(container, selector) {
                    apply_price(&mut found, element_text(node));
                }
            }
        }

        found
    }

    fn extract_stock(&self, container: ElementRef<'_>, product_name: &str) -> StockStatus {
        if let Some(selector) = &self.rules.stock {
            if let Some(node) = select_descendants(container, selector).next() {
                let status =
                    classify_stock_text(&element_text(node), self.stock_patterns.as_ref());
                if status != StockStatus::Unknown {
                    return status;
                }
            }
        }

        if has_sold_out_image(container) {
            return StockStatus::OutOfStock;
        }
        if is_pre_order_name(product_name) {
            return StockStatus::PreOrder;
        }
        StockStatus::InStock
    }

    fn extract_link(&self, container: ElementRef<'_>) -> Option<String> {
        let href = self
            .rules
            .link
            .as_ref()?
            .resolve(container)?
            .value()
            .attr("href")?
            .trim();
        if href.is_empty() {
            return None;
        }

        self.base_url.join(href).ok().map(String::from)
    }
}

fn apply_price(found: &mut (Option<u64>, Option<String>), text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(price) = parse_price(&text) {
        *found = (Some(price), Some(text));
    }
}

/// Text of every descendant text node, each trimmed, concatenated.
///
/// No separator is inserted, so `<b>12</b>,900원` reads as `12,900원`.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShopSelectors;
    use crate::test_support::sample_shop;

    const SEARCH_RESULTS: &str = r#"
        <html><body>
        <div class="product-list">
          <div class="product">
            <a class="name" href="/goods/1">무선 마우스 M100</a>
            <span class="price">₩25,000</span>
            <span class="stock">재고 있음</span>
          </div>
          <div class="product">
            <a class="name" href="https://other.example.com/goods/2">  유선 마우스 <b>G1</b> </a>
            <span class="price">15,000원</span>
            <span class="stock">품절</span>
          </div>
          <div class="product">
            <a class="name" href="goods/3">[예약] 게이밍 마우스</a>
            <span class="price">가격문의</span>
          </div>
        </div>
        </body></html>
    "#;

    const TABLE_RESULTS: &str = r#"
        <table class="list">
          <tr>
            <td><a class="title" href="/item?id=1">키보드 K1</a></td>
            <td>브랜드</td>
            <td>옵션</td>
            <td>32,000원</td>
          </tr>
          <tr>
            <td><a class="title" href="/item?id=2">키보드 K2</a></td>
            <td>브랜드</td>
          </tr>
        </table>
    "#;

    fn extractor_for(shop: &Shop) -> ListingExtractor {
        ListingExtractor::new(shop).unwrap()
    }

    #[test]
    fn test_extract_search_results() {
        let shop = sample_shop(1);
        let listings = extractor_for(&shop).extract(SEARCH_RESULTS);

        assert_eq!(listings.len(), 3);

        let first = &listings[0];
        assert_eq!(first.shop_id, "shop-1");
        assert_eq!(first.shop_name, "상점1");
        assert_eq!(first.product_name, "무선 마우스 M100");
        assert_eq!(first.price, Some(25000));
        assert_eq!(first.price_text.as_deref(), Some("₩25,000"));
        assert_eq!(first.stock_status, StockStatus::InStock);
        assert_eq!(
            first.product_url.as_deref(),
            Some("https://shop1.example.com/goods/1")
        );

        let second = &listings[1];
        assert_eq!(second.product_name, "유선 마우스G1");
        assert_eq!(second.price, Some(15000));
        assert_eq!(second.stock_status, StockStatus::OutOfStock);
        assert_eq!(
            second.product_url.as_deref(),
            Some("https://other.example.com/goods/2")
        );

        let third = &listings[2];
        assert_eq!(third.price, None);
        assert_eq!(third.price_text, None);
        assert_eq!(third.stock_status, StockStatus::PreOrder);
        assert_eq!(
            third.product_url.as_deref(),
            Some("https://shop1.example.com/goods/3")
        );
    }

    #[test]
    fn test_no_results_page() {
        let shop = sample_shop(1);
        let html = "<html><body><p>검색 결과가 없습니다.</p></body></html>";
        assert!(extractor_for(&shop).extract(html).is_empty());
    }

    #[test]
    fn test_last_parseable_price_wins() {
        let shop = sample_shop(1);
        let html = r#"
            <div class="product">
              <span class="name">모니터</span>
              <span class="price">30,000원</span>
              <span class="price">20,000원</span>
              <span class="price">품절</span>
              <span class="price"> </span>
            </div>
        "#;
        let listings = extractor_for(&shop).extract(html);

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, Some(20000));
        assert_eq!(listings[0].price_text.as_deref(), Some("20,000원"));
    }

    #[test]
    fn test_blank_or_missing_name_skipped() {
        let shop = sample_shop(1);
        let html = r#"
            <div class="product"><span class="name">   </span><span class="price">1,000</span></div>
            <div class="product"><span class="price">2,000</span></div>
            <div class="product"><span class="name">케이블</span><span class="price">3,000</span></div>
        "#;
        let listings = extractor_for(&shop).extract(html);

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].product_name, "케이블");
        assert_eq!(listings[0].price, Some(3000));
    }

    #[test]
    fn test_container_as_name_and_link() {
        let mut shop = sample_shop(2);
        shop.selectors = ShopSelectors::new("a.item", SELF_SELECTOR, ".cost");
        shop.selectors.product_link = Some(SELF_SELECTOR.into());
        let html = r#"<a class="item" href="/p/9">스피커 <span class="cost">9,900원</span></a>"#;

        let listings = extractor_for(&shop).extract(html);

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].product_name, "스피커9,900원");
        assert_eq!(listings[0].price, Some(9900));
        assert_eq!(
            listings[0].product_url.as_deref(),
            Some("https://shop2.example.com/p/9")
        );
    }

    #[test]
    fn test_table_sibling_price() {
        let mut shop = sample_shop(3);
        shop.selectors = ShopSelectors::new("a.title", SELF_SELECTOR, "+ td + td + td");
        shop.selectors.product_link = Some(SELF_SELECTOR.into());

        let listings = extractor_for(&shop).extract(TABLE_RESULTS);

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].product_name, "키보드 K1");
        assert_eq!(listings[0].price, Some(32000));
        assert_eq!(
            listings[0].product_url.as_deref(),
            Some("https://shop3.example.com/item?id=1")
        );
        // too few sibling cells
        assert_eq!(listings[1].price, None);
    }

    #[test]
    fn test_sibling_price_from_link_outside_table() {
        let mut shop = sample_shop(1);
        shop.selectors = ShopSelectors::new("a.title", SELF_SELECTOR, "+ span");
        let html = r#"
            <div><a class="title" href="/p/1">마우스패드</a><span>7,500원</span></div>
        "#;

        let listings = extractor_for(&shop).extract(html);

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].product_name, "마우스패드");
        assert_eq!(listings[0].price, Some(7500));
    }

    #[test]
    fn test_general_sibling_price() {
        let mut shop = sample_shop(1);
        shop.selectors = ShopSelectors::new("span.title", SELF_SELECTOR, "~ span");
        let html = r#"<ul><li><span class="title">헤드셋</span><span>45,000원</span></li></ul>"#;

        let listings = extractor_for(&shop).extract(html);

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, Some(45000));
        assert_eq!(listings[0].product_url, None);
    }

    #[test]
    fn test_sold_out_image_after_unknown_stock_text() {
        let shop = sample_shop(1);
        let html = r#"
            <div class="product">
              <span class="name">태블릿</span>
              <span class="stock">문의</span>
              <img src="/icons/SOLDOUT.png">
            </div>
            <div class="product">
              <span class="name">태블릿 케이스</span>
              <img src="/thumb.jpg" alt="일시 품절">
            </div>
        "#;
        let listings = extractor_for(&shop).extract(html);

        assert_eq!(listings.len(), 2);
        assert!(listings.iter().all(Listing::is_out_of_stock));
    }

    #[test]
    fn test_stock_text_beats_image_and_name() {
        let shop = sample_shop(1);
        let html = r#"
            <div class="product">
              <span class="name">[예약] 피규어</span>
              <span class="stock">구매 가능</span>
              <img src="/soldout.png">
            </div>
        "#;
        let listings = extractor_for(&shop).extract(html);

        assert_eq!(listings[0].stock_status, StockStatus::InStock);
    }

    #[test]
    fn test_unknown_stock_defaults_to_in_stock() {
        let shop = sample_shop(1);
        let html = r#"
            <div class="product"><span class="name">충전기</span><span class="stock">문의</span></div>
        "#;
        let listings = extractor_for(&shop).extract(html);

        assert_eq!(listings[0].stock_status, StockStatus::InStock);
    }

    #[test]
    fn test_custom_stock_patterns_applied() {
        let mut shop = sample_shop(1);
        shop.stock_patterns = Some(StockPatterns {
            in_stock: vec!["재고 있음".into()],
            out_of_stock: vec![],
        });
        let html = r#"
            <div class="product">
              <span class="name">SSD 1TB</span>
              <span class="stock">재고 있음 (품절 임박)</span>
            </div>
        "#;
        let listings = extractor_for(&shop).extract(html);

        assert_eq!(listings[0].stock_status, StockStatus::InStock);
    }

    #[test]
    fn test_invalid_base_url() {
        let mut shop = sample_shop(1);
        shop.base_url = "not a url".into();

        assert!(matches!(
            ListingExtractor::new(&shop),
            Err(ExtractError::BaseUrl { .. })
        ));
    }

    #[test]
    fn test_element_text_concatenates_trimmed_pieces() {
        let html = Html::parse_fragment("<p>  a <i> b </i>\n c </p>");
        let selector = scraper::Selector::parse("p").unwrap();
        let p = html.select(&selector).next().unwrap();

        assert_eq!(element_text(p), "abc");
    }

    #[test]
    fn test_price_digits_split_across_tags() {
        let shop = sample_shop(1);
        let html = r#"
            <div class="product">
              <span class="name">노트북 <b>X1</b></span>
              <span class="price"><b>12</b>,900원</span>
              <span class="stock"><em>품</em>절</span>
            </div>
        "#;
        let listings = extractor_for(&shop).extract(html);

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, Some(12900));
        assert_eq!(listings[0].price_text.as_deref(), Some("12,900원"));
        assert_eq!(listings[0].stock_status, StockStatus::OutOfStock);
    }
}
