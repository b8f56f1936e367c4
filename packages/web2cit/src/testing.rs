//! Testing utilities including mock collaborators.
//!
//! These let applications and tests exercise translation without network
//! access. Every mock records its calls so tests can assert how many fetches
//! the shared caches let through.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{FetchError, FetchResult, StorageResult};
use crate::traits::{
    citoid::CitoidClient,
    fetcher::{FetchedPage, PageFetcher},
    revisions::{Revision, RevisionStore},
};
use crate::types::citation::SimpleCitation;
use crate::types::webpage::Services;

/// A mock page fetcher serving predefined HTML.
///
/// Unknown URLs fail with HTTP 404.
#[derive(Default)]
pub struct MockFetcher {
    /// Predefined pages by URL
    pages: RwLock<HashMap<String, FetchedPage>>,

    /// Simulated latency per fetch
    delay: Option<Duration>,

    /// Call tracking for assertions
    calls: RwLock<Vec<String>>,
}

impl MockFetcher {
    /// Create a fetcher with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined page.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.add_page(url, body);
        self
    }

    /// Add a predefined page to a shared fetcher.
    pub fn add_page(&self, url: impl Into<String>, body: impl Into<String>) {
        let url = url.into();
        let page = FetchedPage::new(url.clone(), body).with_header("content-type", "text/html");
        self.pages.write().unwrap().insert(url, page);
    }

    /// Delay every fetch, to let concurrent readers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of fetches of `url`.
    pub fn call_count(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let page = self.pages.read().unwrap().get(url).cloned();
        page.ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock Citoid client serving predefined citations.
///
/// Unknown URLs fail with [`FetchError::NoCitation`].
#[derive(Default)]
pub struct MockCitoid {
    citations: RwLock<HashMap<String, SimpleCitation>>,

    /// Simulated latency per lookup
    delay: Option<Duration>,

    calls: RwLock<Vec<String>>,
}

impl MockCitoid {
    /// Create a client with no citations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined citation.
    pub fn with_citation(self, url: impl Into<String>, citation: SimpleCitation) -> Self {
        self.add_citation(url, citation);
        self
    }

    /// Add a predefined citation to a shared client.
    pub fn add_citation(&self, url: impl Into<String>, citation: SimpleCitation) {
        self.citations.write().unwrap().insert(url.into(), citation);
    }

    /// Delay every lookup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of lookups of `url`.
    pub fn call_count(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl CitoidClient for MockCitoid {
    async fn fetch_simple_citation(&self, url: &str) -> FetchResult<SimpleCitation> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let citation = self.citations.read().unwrap().get(url).cloned();
        citation.ok_or_else(|| FetchError::NoCitation {
            url: url.to_string(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock revision store holding page histories in memory.
#[derive(Default)]
pub struct MockRevisionStore {
    /// Revisions by title, oldest first
    revisions: RwLock<HashMap<String, Vec<Revision>>>,
}

impl MockRevisionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a new revision of `title` with `content`.
    pub fn with_revision(self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.save(title, content);
        self
    }

    /// Save a new revision of `title` with `content`; returns its id.
    pub fn save(&self, title: impl Into<String>, content: impl Into<String>) -> u64 {
        let mut revisions = self.revisions.write().unwrap();
        let revid = revisions.values().map(Vec::len).sum::<usize>() as u64 + 1;
        revisions
            .entry(title.into())
            .or_default()
            .push(Revision::new(revid, chrono::Utc::now()).with_content(content));
        revid
    }
}

#[async_trait]
impl RevisionStore for MockRevisionStore {
    async fn fetch_revisions(
        &self,
        title: &str,
        with_content: bool,
        start_id: Option<u64>,
        max: Option<usize>,
    ) -> StorageResult<Vec<Revision>> {
        let revisions = self.revisions.read().unwrap();
        let Some(history) = revisions.get(title) else {
            return Ok(Vec::new());
        };

        Ok(history
            .iter()
            .rev()
            .filter(|r| start_id.map_or(true, |start| r.revid <= start))
            .take(max.unwrap_or(usize::MAX))
            .map(|r| {
                let mut revision = r.clone();
                if !with_content {
                    revision.content = None;
                }
                revision
            })
            .collect())
    }
}

/// Services backed by fresh mocks, returned alongside for setup and assertions.
pub fn mock_services() -> (Services, Arc<MockFetcher>, Arc<MockCitoid>) {
    let fetcher = Arc::new(MockFetcher::new());
    let citoid = Arc::new(MockCitoid::new());
    let services = Services::new(fetcher.clone(), citoid.clone());
    (services, fetcher, citoid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fetcher_tracks_calls() {
        let fetcher = MockFetcher::new().with_page("https://example.com/", "<html></html>");

        assert!(fetcher.fetch("https://example.com/").await.is_ok());
        assert!(fetcher.fetch("https://example.com/missing").await.is_err());

        assert_eq!(fetcher.calls().len(), 2);
        assert_eq!(fetcher.call_count("https://example.com/"), 1);
    }

    #[tokio::test]
    async fn test_mock_revision_store_newest_first() {
        let store = MockRevisionStore::new()
            .with_revision("Page", "[1]")
            .with_revision("Page", "[2]");

        let all = store.fetch_revisions("Page", true, None, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].content.as_deref(), Some("[2]"));

        let older = store
            .fetch_revisions("Page", false, Some(all[1].revid), Some(1))
            .await
            .unwrap();
        assert_eq!(older.len(), 1);
        assert_eq!(older[0].revid, all[1].revid);
        assert!(older[0].content.is_none());

        assert!(store
            .fetch_revisions("Missing", true, None, None)
            .await
            .unwrap()
            .is_empty());
    }
}
