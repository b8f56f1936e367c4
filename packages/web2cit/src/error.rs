//! Typed errors for the translation engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! configuration mistakes apart from runtime and I/O failures.

use std::sync::Arc;

use thiserror::Error;

/// Errors raised while building rule objects from configuration.
///
/// These are fatal: the offending definition has to be fixed before retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Step config does not satisfy the grammar of its step type
    #[error("invalid {step} config {config:?}: {reason}")]
    InvalidStepConfig {
        step: &'static str,
        config: String,
        reason: String,
    },

    /// Date transformation locale is not supported
    #[error("unsupported date locale: {0:?}")]
    UnsupportedLocale(String),

    /// Step definition names an unknown type
    #[error("unknown {family} type: {kind:?}")]
    UnknownStepType { family: &'static str, kind: String },

    /// Field definition names an unknown field
    #[error("unknown field name: {0:?}")]
    UnknownField(String),

    /// Attempt to make a force-required field optional
    #[error("field {0} is always required")]
    ForceRequired(&'static str),

    /// Glob pattern failed to compile
    #[error("invalid path pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Template path is not an absolute URL path
    #[error("invalid template path: {0:?}")]
    InvalidPath(String),

    /// Domain name is not a valid hostname
    #[error("invalid domain name: {0:?}")]
    InvalidDomain(String),

    /// Target URL could not be used as a webpage
    #[error("invalid webpage URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Definition JSON did not match the expected shape
    #[error("malformed definition: {0}")]
    Definition(String),
}

/// Errors raised by the fetch collaborators (page fetcher, Citoid client).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Citoid returned no citation for the URL
    #[error("no citation returned for {url}")]
    NoCitation { url: String },

    /// Response body could not be decoded
    #[error("invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
}

/// Errors raised while translating a webpage.
#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    /// Template asked to translate a webpage from another domain
    #[error("template for {template_domain} cannot translate a webpage from {target_domain}")]
    CrossDomain {
        template_domain: String,
        target_domain: String,
    },

    /// Step was used before its config was set
    #[error("{step} step has no config")]
    UndefinedConfig { step: &'static str },

    /// XPath expression failed at evaluation time
    #[error("xpath evaluation failed for {expression:?}: {reason}")]
    XPath { expression: String, reason: String },

    /// Underlying fetch failed; shared by every selection reading the same cache
    #[error("fetch failed: {0}")]
    Fetch(#[from] Arc<FetchError>),
}

/// Errors raised by the revision storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Storage API reported an error
    #[error("storage API error: {0}")]
    Api(String),

    /// Revision content was not a JSON array of definitions
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Loaded configuration could not build a domain
    #[error("invalid stored configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for translation operations.
pub type Result<T> = std::result::Result<T, TranslationError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
