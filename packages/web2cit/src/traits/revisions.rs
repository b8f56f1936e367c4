//! Revision storage trait.
//!
//! Domain configurations (templates, patterns, tests) are stored as JSON
//! pages on a wiki. Each save produces a revision; the engine reads the
//! latest one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// One stored revision of a configuration page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    /// Revision id
    pub revid: u64,

    /// When the revision was saved
    pub timestamp: DateTime<Utc>,

    /// Page content, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Revision {
    /// Create a revision without content.
    pub fn new(revid: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            revid,
            timestamp,
            content: None,
        }
    }

    /// Set the page content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Reads revisions of configuration pages.
#[async_trait]
pub trait RevisionStore: Send + Sync {
    /// Fetch revisions of `title`, newest first.
    ///
    /// * `with_content` - include page content in each revision
    /// * `start_id` - start listing at this revision id
    /// * `max` - maximum number of revisions to return
    ///
    /// A page that does not exist yields an empty list.
    async fn fetch_revisions(
        &self,
        title: &str,
        with_content: bool,
        start_id: Option<u64>,
        max: Option<usize>,
    ) -> StorageResult<Vec<Revision>>;
}
