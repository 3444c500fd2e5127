pub mod http_fetcher;

pub use http_fetcher::HttpFetcher;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-request transport settings, derived from the shop being searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub verify_tls: bool,
    /// Encoding label used to decode the body instead of the response charset.
    pub encoding: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            verify_tls: true,
            encoding: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connection,
    HttpStatus,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Timeout => "timed out",
            Self::Connection => "connection failed",
            Self::HttpStatus => "bad HTTP status",
            Self::Other => "request failed",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub detail: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Retrieves a page body as text. Implementations must be shareable across tasks.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, TransportError>;
}
