//! MediaWiki Action API revision store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::clients::build_client;
use crate::error::{StorageError, StorageResult};
use crate::traits::revisions::{Revision, RevisionStore};
use crate::types::config::TranslatorConfig;

/// Reads page revisions with `action=query&prop=revisions`.
pub struct MediaWikiRevisions {
    client: reqwest::Client,
    api: String,
}

impl MediaWikiRevisions {
    pub fn new(config: &TranslatorConfig) -> StorageResult<Self> {
        let client = build_client(config).map_err(|e| StorageError::Http(Box::new(e)))?;
        Ok(Self::with_client(client, &config.mediawiki_api))
    }

    pub fn with_client(client: reqwest::Client, api: &str) -> Self {
        Self {
            client,
            api: api.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<QueryResult>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    info: String,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    pages: Vec<PageResult>,
}

#[derive(Debug, Deserialize)]
struct PageResult {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    revisions: Vec<RevisionResult>,
}

#[derive(Debug, Deserialize)]
struct RevisionResult {
    revid: u64,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    slots: Option<Slots>,
}

#[derive(Debug, Deserialize)]
struct Slots {
    main: MainSlot,
}

#[derive(Debug, Deserialize)]
struct MainSlot {
    #[serde(default)]
    content: Option<String>,
}

fn parse_revisions(response: ApiResponse) -> StorageResult<Vec<Revision>> {
    if let Some(error) = response.error {
        return Err(StorageError::Api(format!("{}: {}", error.code, error.info)));
    }

    let pages = response.query.map(|q| q.pages).unwrap_or_default();
    Ok(pages
        .into_iter()
        .filter(|page| !page.missing)
        .flat_map(|page| page.revisions)
        .map(|r| Revision {
            revid: r.revid,
            timestamp: r.timestamp,
            content: r.slots.and_then(|s| s.main.content),
        })
        .collect())
}

#[async_trait]
impl RevisionStore for MediaWikiRevisions {
    async fn fetch_revisions(
        &self,
        title: &str,
        with_content: bool,
        start_id: Option<u64>,
        max: Option<usize>,
    ) -> StorageResult<Vec<Revision>> {
        let rvprop = if with_content {
            "ids|timestamp|content"
        } else {
            "ids|timestamp"
        };
        let mut params: Vec<(&str, String)> = vec![
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("formatversion", "2".to_string()),
            ("prop", "revisions".to_string()),
            ("titles", title.to_string()),
            ("rvprop", rvprop.to_string()),
            ("rvslots", "main".to_string()),
        ];
        if let Some(start_id) = start_id {
            params.push(("rvstartid", start_id.to_string()));
        }
        if let Some(max) = max {
            params.push(("rvlimit", max.to_string()));
        }

        debug!(title = %title, ?start_id, ?max, "Fetching revisions");
        let response = self
            .client
            .get(&self.api)
            .query(&params)
            .send()
            .await
            .map_err(|e| StorageError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Api(format!("HTTP {} from {}", status, self.api)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StorageError::Http(Box::new(e)))?;
        parse_revisions(serde_json::from_str(&body)?)
    }
}
