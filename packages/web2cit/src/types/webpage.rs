//! Translation target: a webpage and its shared caches.

use std::sync::Arc;
use url::Url;

use crate::cache::{CitoidCache, HttpCache};
use crate::error::{ConfigError, ConfigResult};
use crate::traits::{citoid::CitoidClient, fetcher::PageFetcher};

/// Collaborators a webpage fetches through.
#[derive(Clone)]
pub struct Services {
    pub fetcher: Arc<dyn PageFetcher>,
    pub citoid: Arc<dyn CitoidClient>,
}

impl Services {
    /// Bundle a page fetcher and a Citoid client.
    pub fn new(fetcher: Arc<dyn PageFetcher>, citoid: Arc<dyn CitoidClient>) -> Self {
        Self { fetcher, citoid }
    }
}

/// A webpage to translate.
///
/// Cloning is cheap and clones share the caches, so every template, field
/// and selection evaluated against one webpage triggers at most one page
/// fetch and one Citoid lookup.
#[derive(Clone, Debug)]
pub struct Webpage {
    url: Url,
    domain: String,
    path: String,
    http: Arc<HttpCache>,
    citoid: Arc<CitoidCache>,
}

impl Webpage {
    /// Parse `url` and create its caches.
    pub fn new(url: &str, services: &Services) -> ConfigResult<Self> {
        let invalid = |reason: &str| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("only http and https URLs can be translated"));
        }
        let domain = parsed
            .host_str()
            .ok_or_else(|| invalid("URL has no host"))?
            .to_string();

        let path = match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        };

        let href = parsed.to_string();
        Ok(Self {
            http: Arc::new(HttpCache::for_page(href.clone(), Arc::clone(&services.fetcher))),
            citoid: Arc::new(CitoidCache::for_citoid(href, Arc::clone(&services.citoid))),
            url: parsed,
            domain,
            path,
        })
    }

    /// Full URL.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Host name.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Path including the query string, if any.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Shared page cache.
    pub fn http_cache(&self) -> &HttpCache {
        &self.http
    }

    /// Shared Citoid cache.
    pub fn citoid_cache(&self) -> &CitoidCache {
        &self.citoid
    }
}
