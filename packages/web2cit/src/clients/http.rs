//! Plain HTTP page fetcher.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::clients::build_client;
use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::config::TranslatorConfig;

/// Fetches webpages with a GET request.
///
/// Redirects are followed and the final URL is recorded on the page.
///
/// # Example
///
/// ```rust,ignore
/// use web2cit::clients::HttpFetcher;
/// use web2cit::TranslatorConfig;
///
/// let fetcher = HttpFetcher::new(&TranslatorConfig::from_env())?;
/// let page = fetcher.fetch("https://example.com/").await?;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &TranslatorConfig) -> FetchResult<Self> {
        let client = build_client(config).map_err(|e| FetchError::Http(Box::new(e)))?;
        Ok(Self { client })
    }

    /// Use a preconfigured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        debug!(url = %url, "HTTP fetch starting");
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            FetchError::Http(Box::new(e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        debug!(url = %url, final_url = %final_url, bytes = body.len(), "HTTP fetch complete");
        Ok(headers
            .into_iter()
            .fold(FetchedPage::new(final_url, body), |page, (name, value)| {
                page.with_header(name, value)
            }))
    }

    fn name(&self) -> &str {
        "http"
    }
}
