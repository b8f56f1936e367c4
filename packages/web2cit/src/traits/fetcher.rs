//! Page fetcher trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::FetchResult;

/// A fetched webpage before DOM parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// Raw response body (HTML)
    pub body: String,

    /// Response headers, names lower-cased
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl FetchedPage {
    /// Create a page with no headers.
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Add a response header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Fetches the raw HTML of a webpage.
///
/// Retry and backoff policy, if any, belong to the implementation; the
/// translation engine never retries on its own.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a single URL.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let page = FetchedPage::new("https://example.com", "<html></html>")
            .with_header("Content-Type", "text/html");

        assert_eq!(page.header("content-type"), Some("text/html"));
        assert_eq!(page.header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(page.header("etag"), None);
    }
}
