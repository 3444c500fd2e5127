use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    InStock,
    OutOfStock,
    PreOrder,
    Unknown,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "IN_STOCK",
            Self::OutOfStock => "OUT_OF_STOCK",
            Self::PreOrder => "PRE_ORDER",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product entry extracted from a shop's search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub shop_id: String,
    pub shop_name: String,
    pub product_name: String,
    /// Price in the smallest currency unit (won).
    pub price: Option<u64>,
    /// The matched price text, kept for display and diagnostics.
    pub price_text: Option<String>,
    pub stock_status: StockStatus,
    pub product_url: Option<String>,
    pub crawled_at: DateTime<Utc>,
}

impl Listing {
    /// A listing with only provenance and name filled in.
    pub fn new(
        shop_id: impl Into<String>,
        shop_name: impl Into<String>,
        product_name: impl Into<String>,
    ) -> Self {
        Self {
            shop_id: shop_id.into(),
            shop_name: shop_name.into(),
            product_name: product_name.into(),
            price: None,
            price_text: None,
            stock_status: StockStatus::Unknown,
            product_url: None,
            crawled_at: Utc::now(),
        }
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock_status == StockStatus::OutOfStock
    }
}
