use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;

use crate::app::Result;
use crate::config::HttpConfig;
use crate::domain::lookup_encoding;
use crate::fetcher::{FetchOptions, Fetcher, TransportError, TransportErrorKind};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// reqwest-backed transport.
///
/// Holds one pooled client that verifies certificates and one that does not,
/// so shops with `verify_ssl = false` don't weaken requests to other shops.
pub struct HttpFetcher {
    client: Client,
    insecure_client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config, true)?,
            insecure_client: build_client(config, false)?,
        })
    }
}

fn build_client(config: &HttpConfig, verify_tls: bool) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }

    let client = Client::builder()
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .danger_accept_invalid_certs(!verify_tls)
        .build()?;

    Ok(client)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> std::result::Result<String, TransportError> {
        let client = if options.verify_tls {
            &self.client
        } else {
            &self.insecure_client
        };

        tracing::debug!("GET {}", url);
        let response = client
            .get(url)
            .timeout(options.timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;

        match options.encoding.as_deref() {
            Some(label) => {
                let encoding = lookup_encoding(label)
                    .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()))?;
                let bytes = response.bytes().await.map_err(classify)?;
                let (text, _, had_errors) = encoding.decode(&bytes);
                if had_errors {
                    tracing::debug!("Malformed {} bytes in response from {}", label, url);
                }
                Ok(text.into_owned())
            }
            None => response.text().await.map_err(classify),
        }
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    let kind = if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connection
    } else if error.is_status() {
        TransportErrorKind::HttpStatus
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header_exists("accept-language"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>마우스</p>".as_bytes(), "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let body = fetcher()
            .fetch(&format!("{}/search", server.uri()), &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(body, "<p>마우스</p>");
    }

    #[tokio::test]
    async fn test_fetch_decodes_configured_encoding() {
        let (bytes, _, _) = encoding_rs::EUC_KR.encode("<p>키보드</p>");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(bytes.into_owned(), "text/html"))
            .mount(&server)
            .await;

        let options = FetchOptions {
            encoding: Some("euc-kr".into()),
            ..FetchOptions::default()
        };
        let body = fetcher().fetch(&server.uri(), &options).await.unwrap();

        assert_eq!(body, "<p>키보드</p>");
    }

    #[tokio::test]
    async fn test_fetch_http_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&server.uri(), &FetchOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind, TransportErrorKind::HttpStatus);
        assert!(err.detail.contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let options = FetchOptions {
            timeout: Duration::from_millis(200),
            ..FetchOptions::default()
        };
        let err = fetcher().fetch(&server.uri(), &options).await.unwrap_err();

        assert_eq!(err.kind, TransportErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let err = fetcher()
            .fetch("http://127.0.0.1:1/", &FetchOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind, TransportErrorKind::Connection);
    }
}
