//! Cache of the fetched page.

use chrono::{DateTime, Utc};
use futures::future::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::response::{Loader, ResponseCache};
use crate::dom;
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// A settled page fetch.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects
    pub url: String,

    /// Raw HTML body
    pub body: String,

    /// Response headers, names lower-cased
    pub headers: HashMap<String, String>,

    /// When the fetch resolved
    pub timestamp: DateTime<Utc>,
}

impl HttpResponse {
    /// Wrap a fetched page, stamping the resolution time.
    pub fn from_page(page: FetchedPage) -> Self {
        Self {
            url: page.url,
            body: page.body,
            headers: page.headers,
            timestamp: Utc::now(),
        }
    }

    /// Parse the body into a DOM.
    ///
    /// The DOM is not thread-safe, so it is rebuilt by each reader instead of
    /// being stored alongside the body. Every xpath selection pays one parse:
    /// a template with N xpath fields parses the page N times.
    pub fn document(&self) -> sxd_document::Package {
        dom::parse_html(&self.body)
    }
}

/// Page cache for one webpage.
pub type HttpCache = ResponseCache<HttpResponse>;

impl ResponseCache<HttpResponse> {
    /// Create a page cache for `url` backed by `fetcher`.
    pub fn for_page(url: impl Into<String>, fetcher: Arc<dyn PageFetcher>) -> Self {
        let loader: Loader<HttpResponse> = Arc::new(move |url: String| {
            let fetcher = Arc::clone(&fetcher);
            async move {
                let page = fetcher.fetch(&url).await.inspect_err(|e| {
                    tracing::warn!(url = %url, fetcher = fetcher.name(), error = %e, "Page fetch failed");
                })?;
                Ok(HttpResponse::from_page(page))
            }
            .boxed()
        });
        ResponseCache::new(url, loader)
    }
}
