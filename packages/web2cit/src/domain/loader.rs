//! Loads domain configuration from revision storage.
//!
//! Each domain stores three JSON pages under the storage root, at a title
//! built from its reversed hostname labels:
//!
//! ```text
//! www.example.org -> {root}/org/example/www/templates.json
//!                    {root}/org/example/www/patterns.json
//!                    {root}/org/example/www/tests.json
//! ```

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{Domain, DomainDefinitions};
use crate::error::StorageResult;
use crate::template::FallbackTemplate;
use crate::traits::revisions::RevisionStore;
use crate::types::config::TranslatorConfig;
use crate::types::definitions::{PatternDefinition, TemplateDefinition, TestDefinition};

lazy_static! {
    static ref SYNTAX_HIGHLIGHT: Regex =
        Regex::new(r#"(?s)^\s*<syntaxhighlight[^>]*>(.*)</syntaxhighlight>\s*$"#).unwrap();
}

/// The configuration pages stored per domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Templates,
    Patterns,
    Tests,
}

impl ConfigKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ConfigKind::Templates => "templates.json",
            ConfigKind::Patterns => "patterns.json",
            ConfigKind::Tests => "tests.json",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Reads domain definitions through a [`RevisionStore`].
pub struct DomainConfigLoader {
    store: Arc<dyn RevisionStore>,
    storage_root: String,
    catch_all: String,
}

impl DomainConfigLoader {
    pub fn new(store: Arc<dyn RevisionStore>, config: &TranslatorConfig) -> Self {
        Self {
            store,
            storage_root: config.storage_root.trim_end_matches('/').to_string(),
            catch_all: config.catch_all_pattern.clone(),
        }
    }

    /// Storage title of one configuration page of `domain`.
    pub fn title(&self, domain: &str, kind: ConfigKind) -> String {
        let domain = domain.to_ascii_lowercase();
        let labels: Vec<&str> = domain.split('.').rev().collect();
        format!("{}/{}/{}", self.storage_root, labels.join("/"), kind)
    }

    /// Load definitions of one kind.
    ///
    /// Reads revision `revid` when given, else the latest. A missing page
    /// loads as an empty list; malformed elements are logged and skipped.
    pub async fn fetch_definitions<T: DeserializeOwned>(
        &self,
        domain: &str,
        kind: ConfigKind,
        revid: Option<u64>,
    ) -> StorageResult<Vec<T>> {
        let title = self.title(domain, kind);
        let revisions = self.store.fetch_revisions(&title, true, revid, Some(1)).await?;

        let Some(content) = revisions.into_iter().next().and_then(|r| r.content) else {
            debug!(title = %title, "No stored configuration");
            return Ok(Vec::new());
        };

        let elements: Vec<Value> = serde_json::from_str(strip_syntax_highlight(&content))?;
        let total = elements.len();
        let definitions: Vec<T> = elements
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| {
                serde_json::from_value(element)
                    .map_err(|e| warn!(title = %title, index, error = %e, "Skipping malformed definition"))
                    .ok()
            })
            .collect();

        debug!(title = %title, total, loaded = definitions.len(), "Loaded definitions");
        Ok(definitions)
    }

    /// Load the latest definitions of every kind.
    pub async fn load_definitions(&self, domain: &str) -> StorageResult<DomainDefinitions> {
        let (patterns, templates, tests) = futures::try_join!(
            self.fetch_definitions::<PatternDefinition>(domain, ConfigKind::Patterns, None),
            self.fetch_definitions::<TemplateDefinition>(domain, ConfigKind::Templates, None),
            self.fetch_definitions::<TestDefinition>(domain, ConfigKind::Tests, None),
        )?;
        Ok(DomainDefinitions {
            patterns,
            templates,
            tests,
        })
    }

    /// Load `domain` with an optional fallback template.
    pub async fn load(
        &self,
        domain: &str,
        fallback: Option<FallbackTemplate>,
    ) -> StorageResult<Domain> {
        let definitions = self.load_definitions(domain).await?;
        let mut loaded =
            Domain::from_definitions(domain, &definitions)?.with_catch_all(&self.catch_all)?;
        if let Some(fallback) = fallback {
            loaded = loaded.with_fallback(fallback)?;
        }
        Ok(loaded)
    }
}

/// Remove a `<syntaxhighlight>` wrapper around stored JSON.
pub fn strip_syntax_highlight(content: &str) -> &str {
    SYNTAX_HIGHLIGHT
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map_or(content, |m| m.as_str())
}
