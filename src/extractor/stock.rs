use scraper::ElementRef;

use crate::domain::{StockPatterns, StockStatus};

const OUT_OF_STOCK_KEYWORDS: &[&str] = &["품절", "재고 없음", "일시품절", "sold out"];
const IN_STOCK_KEYWORDS: &[&str] = &["재고 있음", "구매 가능", "바로 구매", "in stock"];
const PRE_ORDER_KEYWORDS: &[&str] = &["예약", "발매예정", "입고예정", "예정"];

const SOLD_OUT_ALT_MARKER: &str = "품절";
const SOLD_OUT_SRC_MARKER: &str = "soldout";

/// Classify explicit stock text.
///
/// Shop patterns are checked before the built-in keywords, and within each
/// group out-of-stock wins over in-stock.
pub fn classify_stock_text(text: &str, patterns: Option<&StockPatterns>) -> StockStatus {
    if text.is_empty() {
        return StockStatus::Unknown;
    }
    let text = text.to_lowercase();

    if let Some(patterns) = patterns {
        if contains_any(&text, &patterns.out_of_stock) {
            return StockStatus::OutOfStock;
        }
        if contains_any(&text, &patterns.in_stock) {
            return StockStatus::InStock;
        }
    }

    if contains_any(&text, OUT_OF_STOCK_KEYWORDS) {
        return StockStatus::OutOfStock;
    }
    if contains_any(&text, IN_STOCK_KEYWORDS) {
        return StockStatus::InStock;
    }

    StockStatus::Unknown
}

/// Whether the container shows a "sold out" badge image.
pub fn has_sold_out_image(container: ElementRef<'_>) -> bool {
    container
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "img")
        .any(|img| {
            let element = img.value();
            element
                .attr("alt")
                .is_some_and(|alt| alt.contains(SOLD_OUT_ALT_MARKER))
                || element
                    .attr("src")
                    .is_some_and(|src| src.to_lowercase().contains(SOLD_OUT_SRC_MARKER))
        })
}

pub fn is_pre_order_name(product_name: &str) -> bool {
    PRE_ORDER_KEYWORDS.iter().any(|kw| product_name.contains(kw))
}

fn contains_any<S: AsRef<str>>(haystack: &str, needles: &[S]) -> bool {
    needles.iter().any(|needle| {
        let needle = needle.as_ref();
        !needle.is_empty() && haystack.contains(&needle.to_lowercase())
    })
}
