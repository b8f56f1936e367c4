//! Cache of the Citoid citation.

use chrono::{DateTime, Utc};
use futures::future::FutureExt;
use std::sync::Arc;

use crate::cache::response::{Loader, ResponseCache};
use crate::traits::citoid::CitoidClient;
use crate::types::citation::SimpleCitation;

/// A settled Citoid lookup.
#[derive(Debug, Clone)]
pub struct CitoidResponse {
    pub citation: SimpleCitation,

    /// When the lookup resolved
    pub timestamp: DateTime<Utc>,
}

/// Citoid cache for one webpage.
pub type CitoidCache = ResponseCache<CitoidResponse>;

impl ResponseCache<CitoidResponse> {
    /// Create a Citoid cache for `url` backed by `client`.
    pub fn for_citoid(url: impl Into<String>, client: Arc<dyn CitoidClient>) -> Self {
        let loader: Loader<CitoidResponse> = Arc::new(move |url: String| {
            let client = Arc::clone(&client);
            async move {
                let citation = client.fetch_simple_citation(&url).await.inspect_err(|e| {
                    tracing::warn!(url = %url, client = client.name(), error = %e, "Citoid lookup failed");
                })?;
                Ok(CitoidResponse {
                    citation,
                    timestamp: Utc::now(),
                })
            }
            .boxed()
        });
        ResponseCache::new(url, loader)
    }
}
