//! Citoid REST API client.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clients::build_client;
use crate::error::{FetchError, FetchResult};
use crate::traits::citoid::CitoidClient;
use crate::types::citation::SimpleCitation;
use crate::types::config::TranslatorConfig;

/// Requests citations in mediawiki format and simplifies the first one.
pub struct CitoidApi {
    client: reqwest::Client,
    endpoint: String,
}

impl CitoidApi {
    pub fn new(config: &TranslatorConfig) -> FetchResult<Self> {
        let client = build_client(config).map_err(|e| FetchError::Http(Box::new(e)))?;
        Ok(Self::with_client(client, &config.citoid_endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Request URL for `url`.
    pub fn request_url(&self, url: &str) -> String {
        format!("{}/{}", self.endpoint, urlencoding::encode(url))
    }
}

#[async_trait]
impl CitoidClient for CitoidApi {
    async fn fetch_simple_citation(&self, url: &str) -> FetchResult<SimpleCitation> {
        let request_url = self.request_url(url);
        debug!(url = %url, request_url = %request_url, "Citoid request");

        let response = self.client.get(&request_url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Citoid request failed");
            FetchError::Http(Box::new(e))
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NoCitation {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: request_url,
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse {
                url: request_url.clone(),
                reason: e.to_string(),
            })?;

        first_citation(&body, url)
    }

    fn name(&self) -> &str {
        "citoid"
    }
}

/// Simplify the first citation of a Citoid response.
fn first_citation(body: &Value, url: &str) -> FetchResult<SimpleCitation> {
    let citations = body.as_array().ok_or_else(|| FetchError::InvalidResponse {
        url: url.to_string(),
        reason: "expected an array of citations".to_string(),
    })?;
    citations
        .first()
        .map(SimpleCitation::from_mediawiki)
        .ok_or_else(|| FetchError::NoCitation {
            url: url.to_string(),
        })
}
