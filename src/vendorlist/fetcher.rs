//! Vendor list document fetching
//!
//! [`DocumentFetcher`] is the capability the refresh scheduler calls into.
//! [`HttpFetcher`] is the reqwest-backed implementation. Fetchers perform a
//! single attempt per call: retry cadence is owned by the scheduler.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client, Response,
};
use serde_json::Value;
use std::time::Duration;

use crate::utils::error::FetchError;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves a structured document from a resource identifier
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch and decode the JSON document at `url`
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

/// HTTP fetcher for vendor list documents
pub struct HttpFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Optional origin override for testing with mock servers
    base_url: Option<String>,
}

impl HttpFetcher {
    /// Create a new fetcher with default settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(
            DEFAULT_TIMEOUT,
            &format!("vendorlist/{}", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Create a new fetcher with a custom timeout and user agent
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: None,
        })
    }

    /// Create a fetcher that sends every request to `base_url`
    ///
    /// The scheme, host and port of each requested URL are replaced by those
    /// of `base_url`; path and query are kept. Used with mock servers.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let mut fetcher = Self::new()?;
        fetcher.base_url = Some(base_url.trim_end_matches('/').to_string());
        Ok(fetcher)
    }

    fn target_url(&self, url: &str) -> Result<String, FetchError> {
        let parsed =
            url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        Ok(match &self.base_url {
            Some(base) => {
                let mut target = format!("{base}{}", parsed.path());
                if let Some(query) = parsed.query() {
                    target.push('?');
                    target.push_str(query);
                }
                target
            }
            None => parsed.to_string(),
        })
    }

    async fn decode_response(response: Response) -> Result<Value, FetchError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let target = self.target_url(url)?;
        tracing::debug!(url = %target, "Fetching vendor list document");

        let response = self.client.get(&target).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        Self::decode_response(response).await
    }
}
