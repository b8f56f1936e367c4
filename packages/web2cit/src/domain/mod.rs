//! Domains: per-website configuration and template dispatch.
//!
//! A [`Domain`] owns everything configured for one hostname: path patterns,
//! templates, an optional fallback template and test definitions.
//!
//! # Dispatch
//!
//! 1. The target path is claimed by the first matching pattern. A catch-all
//!    pattern (`/**` by default) is always last, so every path is claimed.
//! 2. Candidate templates are the ones whose own path the same pattern
//!    claims, in template-list order.
//! 3. The fallback template, if any, is tried last.
//!
//! Candidates are tried one at a time until one applies, unless
//! [`TranslateOptions::try_all`] asks for all of them.

pub mod loader;

use futures::future::join_all;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult, Result, TranslationError};
use crate::pattern::{Pattern, PatternSet};
use crate::template::{FallbackTemplate, Template, TemplateOutput};
use crate::types::definitions::{PatternDefinition, TemplateDefinition, TestDefinition};
use crate::types::webpage::Webpage;

pub use loader::{ConfigKind, DomainConfigLoader};

/// Pattern appended to every domain unless configured otherwise.
pub const DEFAULT_CATCH_ALL: &str = "/**";

lazy_static! {
    static ref HOSTNAME_LABEL: Regex =
        Regex::new(r"^(?i)[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").unwrap();
}

/// Everything stored for one domain, as definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDefinitions {
    #[serde(default)]
    pub patterns: Vec<PatternDefinition>,
    #[serde(default)]
    pub templates: Vec<TemplateDefinition>,
    #[serde(default)]
    pub tests: Vec<TestDefinition>,
}

/// Options for [`Domain::translate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Try only the templates at these paths, in this order, and never the
    /// fallback
    pub templates: Option<Vec<String>>,

    /// Evaluate every candidate concurrently instead of stopping at the
    /// first applicable one
    pub try_all: bool,

    /// Drop outputs of templates that did not apply
    pub only_applicable: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            templates: None,
            try_all: false,
            only_applicable: true,
        }
    }
}

impl TranslateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.templates = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_try_all(mut self, try_all: bool) -> Self {
        self.try_all = try_all;
        self
    }

    pub fn with_only_applicable(mut self, only_applicable: bool) -> Self {
        self.only_applicable = only_applicable;
        self
    }
}

enum Candidate<'a> {
    Template(&'a Template),
    Fallback(&'a FallbackTemplate),
}

impl Candidate<'_> {
    async fn translate(&self, target: &Webpage) -> Result<TemplateOutput> {
        match self {
            Candidate::Template(template) => template.translate(target).await,
            Candidate::Fallback(fallback) => fallback.translate(target).await,
        }
    }
}

/// Configuration and dispatch for one website.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    name: String,
    patterns: PatternSet,
    catch_all: Pattern,
    templates: IndexMap<String, Template>,
    fallback: Option<FallbackTemplate>,
    tests: IndexMap<String, TestDefinition>,
}

impl Domain {
    /// An empty domain for hostname `name`.
    ///
    /// Hostnames are case-insensitive; the name is stored lower-cased, as
    /// [`Webpage::domain`] reports it.
    pub fn new(name: impl Into<String>) -> ConfigResult<Self> {
        let name = name.into().to_ascii_lowercase();
        if !is_valid_hostname(&name) {
            return Err(ConfigError::InvalidDomain(name));
        }
        Ok(Self {
            name,
            patterns: PatternSet::new(),
            catch_all: Pattern::new(DEFAULT_CATCH_ALL)?,
            templates: IndexMap::new(),
            fallback: None,
            tests: IndexMap::new(),
        })
    }

    /// Build a domain from definition lists.
    ///
    /// Invalid or duplicate elements are logged and skipped; only an invalid
    /// domain name is fatal.
    pub fn from_definitions(
        name: impl Into<String>,
        definitions: &DomainDefinitions,
    ) -> ConfigResult<Self> {
        let mut domain = Self::new(name)?;
        domain.patterns = PatternSet::from_definitions(&definitions.patterns);

        for definition in &definitions.templates {
            match Template::create(domain.name.as_str(), definition) {
                Ok(template) => domain.insert_template(template),
                Err(e) => warn!(
                    domain = %domain.name,
                    path = %definition.path,
                    error = %e,
                    "Skipping invalid template"
                ),
            }
        }

        for test in &definitions.tests {
            domain.insert_test(test.clone());
        }

        debug!(
            domain = %domain.name,
            patterns = domain.patterns.len(),
            templates = domain.templates.len(),
            tests = domain.tests.len(),
            "Domain loaded"
        );
        Ok(domain)
    }

    /// Replace the patterns; the catch-all is still appended.
    pub fn with_patterns(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.patterns = PatternSet::new();
        for pattern in patterns {
            self.patterns.push(pattern);
        }
        self
    }

    /// Replace the catch-all pattern.
    pub fn with_catch_all(mut self, pattern: &str) -> ConfigResult<Self> {
        self.catch_all = Pattern::new(pattern)?;
        Ok(self)
    }

    /// Replace the templates; templates of other domains and later
    /// duplicates of a path are skipped.
    pub fn with_templates(mut self, templates: impl IntoIterator<Item = Template>) -> Self {
        self.templates = IndexMap::new();
        for template in templates {
            self.insert_template(template);
        }
        self
    }

    /// Set the fallback template; one from another domain is rejected.
    pub fn with_fallback(mut self, fallback: FallbackTemplate) -> ConfigResult<Self> {
        if fallback.domain() != self.name {
            return Err(ConfigError::InvalidDomain(fallback.domain().to_string()));
        }
        self.fallback = Some(fallback);
        Ok(self)
    }

    pub fn with_tests(mut self, tests: impl IntoIterator<Item = TestDefinition>) -> Self {
        self.tests = IndexMap::new();
        for test in tests {
            self.insert_test(test);
        }
        self
    }

    fn insert_template(&mut self, template: Template) {
        if template.domain() != self.name {
            warn!(
                domain = %self.name,
                template_domain = template.domain(),
                "Skipping template of another domain"
            );
        } else if self.templates.contains_key(template.path()) {
            warn!(domain = %self.name, path = template.path(), "Duplicate template path ignored");
        } else {
            self.templates.insert(template.path().to_string(), template);
        }
    }

    fn insert_test(&mut self, test: TestDefinition) {
        if self.tests.contains_key(&test.path) {
            warn!(domain = %self.name, path = %test.path, "Duplicate test path ignored");
        } else {
            self.tests.insert(test.path.clone(), test);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Patterns in matching order, catch-all last.
    pub fn patterns(&self) -> PatternSet {
        let mut patterns = self.patterns.clone();
        patterns.push(self.catch_all.clone());
        patterns
    }

    pub fn catch_all(&self) -> &Pattern {
        &self.catch_all
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Template at `path`.
    pub fn template(&self, path: &str) -> Option<&Template> {
        self.templates.get(path)
    }

    pub fn fallback(&self) -> Option<&FallbackTemplate> {
        self.fallback.as_ref()
    }

    pub fn tests(&self) -> impl Iterator<Item = &TestDefinition> {
        self.tests.values()
    }

    /// Test definition for `path`.
    pub fn test(&self, path: &str) -> Option<&TestDefinition> {
        self.tests.get(path)
    }

    /// Pattern claiming `path`.
    pub fn match_path(&self, path: &str) -> Option<Pattern> {
        self.patterns().match_path(path).cloned()
    }

    /// Group `paths` under their first matching pattern.
    pub fn sort_paths<'a>(
        &self,
        paths: impl IntoIterator<Item = &'a str>,
    ) -> IndexMap<String, Vec<String>> {
        self.patterns().sort_paths(paths)
    }

    pub fn to_definitions(&self) -> DomainDefinitions {
        DomainDefinitions {
            patterns: self.patterns.to_definitions(),
            templates: self.templates.values().map(Template::to_definition).collect(),
            tests: self.tests.values().cloned().collect(),
        }
    }

    fn candidates(&self, target: &Webpage, options: &TranslateOptions) -> Vec<Candidate<'_>> {
        if let Some(paths) = &options.templates {
            return paths
                .iter()
                .filter_map(|path| {
                    let template = self.templates.get(path);
                    if template.is_none() {
                        warn!(domain = %self.name, path = %path, "No template at requested path");
                    }
                    template.map(Candidate::Template)
                })
                .collect();
        }

        let patterns = self.patterns();
        let bucket = patterns.match_path(target.path()).map(Pattern::as_str);
        info!(
            domain = %self.name,
            path = target.path(),
            pattern = bucket.unwrap_or_default(),
            "Path matched"
        );

        let mut candidates: Vec<Candidate<'_>> = match bucket {
            Some(bucket) => self
                .templates
                .values()
                .filter(|t| patterns.match_path(t.path()).map(Pattern::as_str) == Some(bucket))
                .map(Candidate::Template)
                .collect(),
            None => Vec::new(),
        };
        if let Some(fallback) = &self.fallback {
            candidates.push(Candidate::Fallback(fallback));
        }
        candidates
    }

    /// Translate `target` with the domain's templates.
    ///
    /// Returns the outputs of the templates tried, in trial order. An empty
    /// result means no template applied.
    pub async fn translate(
        &self,
        target: &Webpage,
        options: &TranslateOptions,
    ) -> Result<Vec<TemplateOutput>> {
        if target.domain() != self.name {
            return Err(TranslationError::CrossDomain {
                template_domain: self.name.clone(),
                target_domain: target.domain().to_string(),
            });
        }

        let candidates = self.candidates(target, options);

        let outputs = if options.try_all {
            join_all(candidates.iter().map(|c| c.translate(target)))
                .await
                .into_iter()
                .collect::<Result<Vec<_>>>()?
        } else {
            let mut outputs = Vec::new();
            for candidate in &candidates {
                let output = candidate.translate(target).await?;
                let applicable = output.applicable;
                outputs.push(output);
                if applicable {
                    break;
                }
            }
            outputs
        };

        let outputs: Vec<_> = if options.only_applicable {
            outputs.into_iter().filter(|o| o.applicable).collect()
        } else {
            outputs
        };

        info!(
            domain = %self.name,
            target = target.url(),
            candidates = candidates.len(),
            applicable = outputs.iter().filter(|o| o.applicable).count(),
            "Domain translated"
        );
        Ok(outputs)
    }
}

fn is_valid_hostname(name: &str) -> bool {
    !name.is_empty() && name.len() <= 253 && name.split('.').all(|label| HOSTNAME_LABEL.is_match(label))
}
