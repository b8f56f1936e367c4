//! Memoized fetch shared by every reader of one webpage.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::error::{FetchError, FetchResult, Result};

/// The memoized outcome of one fetch, awaitable by any number of readers.
pub type SharedFetch<T> = Shared<BoxFuture<'static, std::result::Result<Arc<T>, Arc<FetchError>>>>;

/// Issues the underlying fetch for a URL.
pub type Loader<T> = Arc<dyn Fn(String) -> BoxFuture<'static, FetchResult<T>> + Send + Sync>;

/// Observable state of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No fetch issued yet
    Empty,
    /// Fetch issued, not settled
    Pending,
    /// Last fetch succeeded
    Resolved,
    /// Last fetch failed; stays failed until refreshed
    Rejected,
}

/// Memoizes the single outstanding or last-settled fetch for one URL.
///
/// Concurrent [`get_data`](Self::get_data) calls receive clones of the same
/// shared future, so only one underlying fetch runs. Failures are sticky: a
/// rejected fetch is returned again until a `refresh = true` call replaces it.
/// Refreshing while a fetch is in flight returns the in-flight fetch.
pub struct ResponseCache<T> {
    url: String,
    loader: Loader<T>,
    data: Mutex<Option<SharedFetch<T>>>,
    refreshing: Arc<AtomicBool>,
}

impl<T: Send + Sync + 'static> ResponseCache<T> {
    /// Create an empty cache for `url`.
    pub fn new(url: impl Into<String>, loader: Loader<T>) -> Self {
        Self {
            url: url.into(),
            loader,
            data: Mutex::new(None),
            refreshing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// URL this cache fetches.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether a fetch is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Current state of the memoized fetch.
    pub fn state(&self) -> CacheState {
        match self.data.lock().as_ref() {
            None => CacheState::Empty,
            Some(fetch) => match fetch.peek() {
                None => CacheState::Pending,
                Some(Ok(_)) => CacheState::Resolved,
                Some(Err(_)) => CacheState::Rejected,
            },
        }
    }

    /// Settled data, if the last fetch succeeded.
    pub fn peek(&self) -> Option<Arc<T>> {
        self.data
            .lock()
            .as_ref()
            .and_then(|fetch| fetch.peek().cloned())
            .and_then(|result| result.ok())
    }

    /// Get the memoized fetch, issuing one if needed.
    ///
    /// A new fetch is issued when none exists yet, or when `refresh` is set
    /// and no fetch is in flight.
    pub fn get_data(&self, refresh: bool) -> SharedFetch<T> {
        let mut data = self.data.lock();

        if let Some(existing) = data.as_ref() {
            if !refresh || self.is_refreshing() {
                return existing.clone();
            }
        }

        debug!(url = %self.url, refresh, "Issuing fetch");
        self.refreshing.store(true, Ordering::Release);

        let refreshing = Arc::clone(&self.refreshing);
        let pending = (self.loader)(self.url.clone());
        let fetch = async move {
            let result = pending.await.map(Arc::new).map_err(Arc::new);
            refreshing.store(false, Ordering::Release);
            result
        }
        .boxed()
        .shared();

        *data = Some(fetch.clone());
        fetch
    }

    /// Await the memoized data, mapping failures into translation errors.
    pub async fn data(&self, refresh: bool) -> Result<Arc<T>> {
        Ok(self.get_data(refresh).await?)
    }
}

impl<T> std::fmt::Debug for ResponseCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("url", &self.url)
            .field("refreshing", &self.refreshing.load(Ordering::Relaxed))
            .finish()
    }
}
