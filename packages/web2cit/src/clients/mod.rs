//! Default `reqwest`-backed collaborators.
//!
//! - [`HttpFetcher`] - [`PageFetcher`](crate::traits::fetcher::PageFetcher) over plain HTTP
//! - [`CitoidApi`] - [`CitoidClient`](crate::traits::citoid::CitoidClient) over the Citoid REST API
//! - [`MediaWikiRevisions`] - [`RevisionStore`](crate::traits::revisions::RevisionStore) over the MediaWiki Action API

pub mod citoid;
pub mod http;
pub mod mediawiki;

pub use citoid::CitoidApi;
pub use http::HttpFetcher;
pub use mediawiki::MediaWikiRevisions;

use crate::types::config::TranslatorConfig;

/// Build a client with the configured user agent and timeout.
pub(crate) fn build_client(config: &TranslatorConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .build()
}
