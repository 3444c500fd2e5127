use std::sync::LazyLock;

use regex::Regex;

static PRICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9,]+").expect("price pattern is a valid regex"));

/// Parse the first run of digits and commas in `text` as a price.
///
/// `"₩25,000"`, `"15,000원"` and `"₩ 30,000"` all parse; text without
/// digits yields `None`.
pub fn parse_price(text: &str) -> Option<u64> {
    let digits: String = PRICE_PATTERN
        .find(text)?
        .as_str()
        .chars()
        .filter(|c| *c != ',')
        .collect();
    digits.parse().ok()
}
