use thiserror::Error;

use crate::aggregator::CrawlError;
use crate::config::ConfigError;
use crate::domain::ValidationError;

#[derive(Error, Debug)]
pub enum PlapriceError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid shop configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error("Shop not found: {0}")]
    ShopNotFound(String),

    #[error("Shop already exists: {0}")]
    DuplicateShop(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PlapriceError>;
