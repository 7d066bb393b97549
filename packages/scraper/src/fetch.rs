//! Document fetching.
//!
//! [`Fetcher`] is the seam between scraping and the network. Production
//! code uses [`HttpFetcher`]; tests use [`MemoryFetcher`] with canned
//! pages.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::FetchError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("fieldscrape/", env!("CARGO_PKG_VERSION"));

/// Fetches one document body per address.
pub trait Fetcher: Send + Sync {
    /// Fetches the document at `url` as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the document cannot be retrieved or the
    /// server answers with a non-success status.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP client settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            headers: BTreeMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl FetchConfig {
    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header to every request.
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        user_agent.clone_into(&mut self.user_agent);
        self
    }
}

/// [`Fetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// * [`FetchError::InvalidHeader`] if a configured header is not valid HTTP
    /// * [`FetchError::Client`] if the client cannot be built
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| FetchError::InvalidHeader(key.clone()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| FetchError::InvalidHeader(key.clone()))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        log::debug!("GET {url}");

        let request_error = |source| FetchError::Request {
            url: url.to_owned(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(request_error)?;

        response.text().await.map_err(request_error)
    }
}

/// [`Fetcher`] serving canned documents from memory.
///
/// Any address without a registered document fails with
/// [`FetchError::NotFound`], which stands in for an unreachable source.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    pages: BTreeMap<String, String>,
}

impl MemoryFetcher {
    /// Creates a fetcher with no documents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `body` as the document at `url`.
    #[must_use]
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_owned(), body.to_owned());
        self
    }
}

impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_header_names() {
        let config = FetchConfig::default().with_header("bad header", "x");
        assert!(matches!(
            HttpFetcher::new(&config),
            Err(FetchError::InvalidHeader(name)) if name == "bad header"
        ));
    }

    #[tokio::test]
    async fn memory_fetcher_serves_registered_pages_only() {
        let fetcher = MemoryFetcher::new().with_page("https://a.test/x", "<p>x</p>");

        assert_eq!(fetcher.fetch("https://a.test/x").await.unwrap(), "<p>x</p>");
        assert!(matches!(
            fetcher.fetch("https://a.test/y").await,
            Err(FetchError::NotFound(_))
        ));
    }
}
