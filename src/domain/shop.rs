use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::extractor::{ExtractError, ExtractionRules};

/// Token in `search_url_template` replaced by the encoded keyword.
pub const KEYWORD_PLACEHOLDER: &str = "{keyword}";

pub const MAX_NAME_LEN: usize = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("shop name must be 1-50 characters, got {0}")]
    NameLength(usize),

    #[error("base_url must be an absolute http:// or https:// URL: {0}")]
    BaseUrl(String),

    #[error("search_url_template must contain the {{keyword}} placeholder")]
    MissingPlaceholder,

    #[error("search_url_template is not an absolute http:// or https:// URL: {0}")]
    TemplateUrl(String),

    #[error("unknown keyword encoding: {0}")]
    UnknownEncoding(String),

    #[error(transparent)]
    Selector(#[from] ExtractError),

    #[error("search keyword must not be empty")]
    EmptyKeyword,
}

/// CSS selectors locating listing fields in a search results page.
///
/// `product_name` and `product_link` accept `.` to mean the container itself.
/// `product_price` may instead be a sibling expression such as `+ td + td`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSelectors {
    pub product_container: String,
    pub product_name: String,
    pub product_price: String,
    #[serde(default)]
    pub product_link: Option<String>,
    #[serde(default)]
    pub stock_status: Option<String>,
}

impl ShopSelectors {
    pub fn new(
        product_container: impl Into<String>,
        product_name: impl Into<String>,
        product_price: impl Into<String>,
    ) -> Self {
        Self {
            product_container: product_container.into(),
            product_name: product_name.into(),
            product_price: product_price.into(),
            product_link: None,
            stock_status: None,
        }
    }
}

/// Shop-specific stock texts, matched case-insensitively before the built-in keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPatterns {
    #[serde(default)]
    pub in_stock: Vec<String>,
    #[serde(default)]
    pub out_of_stock: Vec<String>,
}

impl StockPatterns {
    pub fn is_empty(&self) -> bool {
        self.in_stock.is_empty() && self.out_of_stock.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    #[serde(default = "new_shop_id")]
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub search_url_template: String,
    pub selectors: ShopSelectors,
    #[serde(default)]
    pub stock_patterns: Option<StockPatterns>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
    #[serde(default)]
    pub keyword_encoding: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn new_shop_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

impl Shop {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        search_url_template: impl Into<String>,
        selectors: ShopSelectors,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_shop_id(),
            name: name.into(),
            base_url: base_url.into(),
            search_url_template: search_url_template.into(),
            selectors,
            stock_patterns: None,
            enabled: true,
            verify_ssl: true,
            keyword_encoding: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check every invariant a stored shop must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_LEN {
            return Err(ValidationError::NameLength(name_len));
        }

        if !is_http_url(&self.base_url) {
            return Err(ValidationError::BaseUrl(self.base_url.clone()));
        }

        if !self.search_url_template.contains(KEYWORD_PLACEHOLDER) {
            return Err(ValidationError::MissingPlaceholder);
        }
        if !is_http_url(&self.search_url_template.replace(KEYWORD_PLACEHOLDER, "q")) {
            return Err(ValidationError::TemplateUrl(
                self.search_url_template.clone(),
            ));
        }

        if let Some(label) = &self.keyword_encoding {
            lookup_encoding(label)?;
        }

        ExtractionRules::compile(&self.selectors)?;
        Ok(())
    }

    /// Build the search URL for `keyword`.
    ///
    /// The keyword is encoded with `keyword_encoding` (UTF-8 when unset) and
    /// percent-encoded before replacing every placeholder in the template.
    /// Every byte outside `A-Z a-z 0-9 - _ . ~` is escaped, `/` included, so
    /// `a/b` becomes `a%2Fb`.
    pub fn search_url(&self, keyword: &str) -> Result<String, ValidationError> {
        let encoded = encode_keyword(keyword, self.keyword_encoding.as_deref())?;
        Ok(self.search_url_template.replace(KEYWORD_PLACEHOLDER, &encoded))
    }
}

/// Resolve a WHATWG encoding label such as `euc-kr` or `utf-8`.
pub fn lookup_encoding(label: &str) -> Result<&'static Encoding, ValidationError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ValidationError::UnknownEncoding(label.to_string()))
}

fn encode_keyword(keyword: &str, label: Option<&str>) -> Result<String, ValidationError> {
    match label {
        None => Ok(urlencoding::encode(keyword).into_owned()),
        Some(label) => {
            let encoding = lookup_encoding(label)?;
            let (bytes, _, _) = encoding.encode(keyword);
            Ok(urlencoding::encode_binary(&bytes).into_owned())
        }
    }
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
