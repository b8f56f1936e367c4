//! Configuration for translation, storage lookups and the default clients.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Citoid endpoint (mediawiki format).
pub const DEFAULT_CITOID_ENDPOINT: &str =
    "https://en.wikipedia.org/api/rest_v1/data/citation/mediawiki";

/// Default MediaWiki Action API endpoint holding domain configurations.
pub const DEFAULT_MEDIAWIKI_API: &str = "https://meta.wikimedia.org/w/api.php";

/// Settings shared by the translator and its default collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// User agent sent by the HTTP clients.
    pub user_agent: String,

    /// Per-request timeout in seconds.
    ///
    /// Default: 30.
    pub request_timeout_secs: u64,

    /// Citoid endpoint; the encoded target URL is appended as a path segment.
    pub citoid_endpoint: String,

    /// MediaWiki Action API endpoint for revision storage.
    pub mediawiki_api: String,

    /// Title prefix under which domain configurations are stored.
    ///
    /// Default: `Web2Cit/data`.
    pub storage_root: String,

    /// Pattern appended after every domain's own patterns so each path is
    /// claimed by some bucket.
    ///
    /// Default: `/**`.
    pub catch_all_pattern: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            user_agent: "Web2Cit/1.0".to_string(),
            request_timeout_secs: 30,
            citoid_endpoint: DEFAULT_CITOID_ENDPOINT.to_string(),
            mediawiki_api: DEFAULT_MEDIAWIKI_API.to_string(),
            storage_root: "Web2Cit/data".to_string(),
            catch_all_pattern: "/**".to_string(),
        }
    }
}

impl TranslatorConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `WEB2CIT_*` environment variables.
    ///
    /// Recognized: `WEB2CIT_USER_AGENT`, `WEB2CIT_REQUEST_TIMEOUT_SECS`,
    /// `WEB2CIT_CITOID_ENDPOINT`, `WEB2CIT_MEDIAWIKI_API`, `WEB2CIT_STORAGE_ROOT`,
    /// `WEB2CIT_CATCH_ALL_PATTERN`.
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("WEB2CIT_USER_AGENT") {
            config.user_agent = value;
        }
        if let Ok(value) = std::env::var("WEB2CIT_REQUEST_TIMEOUT_SECS") {
            match value.parse() {
                Ok(secs) => config.request_timeout_secs = secs,
                Err(_) => tracing::warn!(value = %value, "Ignoring invalid WEB2CIT_REQUEST_TIMEOUT_SECS"),
            }
        }
        if let Ok(value) = std::env::var("WEB2CIT_CITOID_ENDPOINT") {
            config.citoid_endpoint = value;
        }
        if let Ok(value) = std::env::var("WEB2CIT_MEDIAWIKI_API") {
            config.mediawiki_api = value;
        }
        if let Ok(value) = std::env::var("WEB2CIT_STORAGE_ROOT") {
            config.storage_root = value;
        }
        if let Ok(value) = std::env::var("WEB2CIT_CATCH_ALL_PATTERN") {
            config.catch_all_pattern = value;
        }

        config
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set the Citoid endpoint.
    pub fn with_citoid_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.citoid_endpoint = endpoint.into();
        self
    }

    /// Set the MediaWiki API endpoint.
    pub fn with_mediawiki_api(mut self, endpoint: impl Into<String>) -> Self {
        self.mediawiki_api = endpoint.into();
        self
    }

    /// Set the storage root.
    pub fn with_storage_root(mut self, root: impl Into<String>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Set the catch-all pattern.
    pub fn with_catch_all_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.catch_all_pattern = pattern.into();
        self
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TranslatorConfig::new();
        assert_eq!(config.catch_all_pattern, "/**");
        assert_eq!(config.storage_root, "Web2Cit/data");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_builder() {
        let config = TranslatorConfig::new()
            .with_user_agent("TestBot/0.1")
            .with_request_timeout_secs(5)
            .with_storage_root("Test/data");

        assert_eq!(config.user_agent, "TestBot/0.1");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.storage_root, "Test/data");
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("WEB2CIT_CATCH_ALL_PATTERN", "/**/*");
        std::env::set_var("WEB2CIT_REQUEST_TIMEOUT_SECS", "soon");
        let config = TranslatorConfig::from_env();
        std::env::remove_var("WEB2CIT_CATCH_ALL_PATTERN");
        std::env::remove_var("WEB2CIT_REQUEST_TIMEOUT_SECS");

        assert_eq!(config.catch_all_pattern, "/**/*");
        assert_eq!(config.request_timeout_secs, 30);
    }
}
