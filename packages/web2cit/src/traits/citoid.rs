//! Citoid client trait.

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::citation::SimpleCitation;

/// Fetches the simplified Citoid citation for a URL.
#[async_trait]
pub trait CitoidClient: Send + Sync {
    /// Fetch the simplified citation Citoid produces for `url`.
    async fn fetch_simple_citation(&self, url: &str) -> FetchResult<SimpleCitation>;

    /// Get the client name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
