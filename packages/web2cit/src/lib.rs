//! Declarative Citation Extraction Library
//!
//! Extracts bibliographic citations (title, authors, date, ...) from webpages
//! by running per-domain, declaratively configured rules against the page's
//! HTML or its Citoid citation.
//!
//! # Design
//!
//! - Rules are data: every rule object is built from a JSON definition and
//!   converts back to one
//! - Rule objects are immutable; reconfiguration returns a rebuilt object
//! - I/O lives behind traits; one fetch per webpage is shared by every rule
//! - Non-applicability is an outcome, not an error
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use web2cit::clients::{CitoidApi, HttpFetcher, MediaWikiRevisions};
//! use web2cit::{DomainConfigLoader, FallbackTemplate, Services, TranslateOptions, TranslatorConfig, Webpage};
//!
//! let config = TranslatorConfig::from_env();
//! let services = Services::new(
//!     Arc::new(HttpFetcher::new(&config)?),
//!     Arc::new(CitoidApi::new(&config)?),
//! );
//! let loader = DomainConfigLoader::new(Arc::new(MediaWikiRevisions::new(&config)?), &config);
//!
//! let target = Webpage::new("https://www.example.org/article/1", &services)?;
//! let domain = loader
//!     .load(target.domain(), Some(FallbackTemplate::citoid_default(target.domain())))
//!     .await?;
//!
//! for output in domain.translate(&target, &TranslateOptions::default()).await? {
//!     println!("{:?}", output.citation);
//! }
//! ```
//!
//! # Modules
//!
//! - [`steps`] - Selections and transformations
//! - [`procedure`], [`field`], [`template`] - Rule evaluation
//! - [`pattern`], [`domain`] - Path patterns and template dispatch
//! - [`cache`] - Per-webpage response caches
//! - [`dom`] - HTML parsing and XPath evaluation
//! - [`traits`] - Collaborator abstractions (page fetcher, Citoid, revision storage)
//! - [`clients`] - Default HTTP implementations of the collaborators
//! - [`types`] - Citations, definitions, configuration and webpages
//! - [`testing`] - Mock implementations for testing

pub mod cache;
pub mod clients;
pub mod dom;
pub mod domain;
pub mod error;
pub mod field;
pub mod pattern;
pub mod procedure;
pub mod steps;
pub mod template;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ConfigError, FetchError, StorageError, TranslationError};
pub use traits::{
    citoid::CitoidClient,
    fetcher::{FetchedPage, PageFetcher},
    revisions::{Revision, RevisionStore},
};
pub use types::{
    citation::{Author, Citation, CitationValue, SimpleCitation},
    config::TranslatorConfig,
    definitions::{
        FallbackTemplateDefinition, PatternDefinition, ProcedureDefinition, SelectionDefinition,
        TemplateDefinition, TemplateFieldDefinition, TestDefinition, TestFieldDefinition,
        TransformationDefinition,
    },
    field_name::FieldName,
    webpage::{Services, Webpage},
};

// Re-export rule evaluation
pub use domain::{
    ConfigKind, Domain, DomainConfigLoader, DomainDefinitions, TranslateOptions,
};
pub use field::{FieldOutput, TemplateField};
pub use pattern::{Pattern, PatternSet};
pub use procedure::{Procedure, ProcedureOutput};
pub use steps::{Selection, StepOutput, Transformation};
pub use template::{FallbackTemplate, Template, TemplateOutput};

// Re-export caches
pub use cache::{CacheState, CitoidCache, HttpCache, ResponseCache};

// Re-export testing utilities
pub use testing::{MockCitoid, MockFetcher, MockRevisionStore};
