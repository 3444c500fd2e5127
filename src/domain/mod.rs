pub mod listing;
pub mod query;
pub mod shop;

pub use listing::{Listing, StockStatus};
pub use query::normalize_keyword;
pub use shop::{
    lookup_encoding, Shop, ShopSelectors, StockPatterns, ValidationError, KEYWORD_PLACEHOLDER,
    MAX_NAME_LEN,
};
