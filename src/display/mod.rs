pub mod export;
pub mod table;

pub use export::{export_csv, outcome_to_json, to_json, to_tab_separated, write_csv, ListingView};
pub use table::TableRenderer;

use crate::domain::StockStatus;

/// `₩25,000`, or `-` when there is no price.
pub fn format_price(price: Option<u64>) -> String {
    let Some(price) = price else {
        return "-".to_string();
    };

    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("₩{grouped}")
}

/// Stock label used in terminal tables.
pub fn stock_label(status: StockStatus) -> &'static str {
    match status {
        StockStatus::InStock => "✓ 재고 있음",
        StockStatus::OutOfStock => "✗ 품절",
        StockStatus::PreOrder => "⏰ 예약상품",
        StockStatus::Unknown => "? 알 수 없음",
    }
}

/// Stock label used in CSV and clipboard exports.
pub fn stock_export_label(status: StockStatus) -> &'static str {
    match status {
        StockStatus::InStock => "재고있음",
        StockStatus::OutOfStock => "품절",
        StockStatus::PreOrder => "예약상품",
        StockStatus::Unknown => "알수없음",
    }
}
