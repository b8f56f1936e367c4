//! Selection steps: read raw data about a webpage.

use tracing::debug;

use crate::dom;
use crate::error::{ConfigError, ConfigResult, Result, TranslationError};
use crate::steps::StepOutput;
use crate::types::citation::SIMPLE_CITATION_FIELDS;
use crate::types::definitions::SelectionDefinition;
use crate::types::webpage::Webpage;

/// Reads one key of the webpage's simplified Citoid citation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitoidSelection {
    field: Option<String>,
}

impl CitoidSelection {
    /// Select `field`; it must be a simplified citation key.
    pub fn new(field: &str) -> ConfigResult<Self> {
        if !SIMPLE_CITATION_FIELDS.contains(&field) {
            return Err(ConfigError::InvalidStepConfig {
                step: "citoid",
                config: field.to_string(),
                reason: "not a Citoid citation field".to_string(),
            });
        }
        Ok(Self {
            field: Some(field.to_string()),
        })
    }

    /// A selection with no field yet; selecting with it fails.
    pub fn unconfigured() -> Self {
        Self { field: None }
    }

    /// Selected key.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    async fn select(&self, target: &Webpage) -> Result<StepOutput> {
        let field = self
            .field
            .as_deref()
            .ok_or(TranslationError::UndefinedConfig { step: "citoid" })?;

        let response = target.citoid_cache().data(false).await?;
        Ok(response
            .citation
            .get(field)
            .map(|value| value.to_vec())
            .unwrap_or_default())
    }
}

/// Evaluates an XPath expression against the webpage's DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPathSelection {
    expression: Option<String>,
}

impl XPathSelection {
    /// Select with `expression`; it must compile.
    pub fn new(expression: &str) -> ConfigResult<Self> {
        dom::validate_xpath(expression).map_err(|reason| ConfigError::InvalidStepConfig {
            step: "xpath",
            config: expression.to_string(),
            reason,
        })?;
        Ok(Self {
            expression: Some(expression.to_string()),
        })
    }

    /// A selection with no expression yet; selecting with it fails.
    pub fn unconfigured() -> Self {
        Self { expression: None }
    }

    /// XPath expression.
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    async fn select(&self, target: &Webpage) -> Result<StepOutput> {
        let expression = self
            .expression
            .as_deref()
            .ok_or(TranslationError::UndefinedConfig { step: "xpath" })?;

        let response = target.http_cache().data(false).await?;
        evaluate(&response.body, expression)
    }
}

/// Parse and evaluate in one synchronous scope; the DOM must not cross an await.
fn evaluate(body: &str, expression: &str) -> Result<StepOutput> {
    let document = dom::parse_html(body);
    dom::select(&document, expression).map_err(|reason| TranslationError::XPath {
        expression: expression.to_string(),
        reason,
    })
}

/// A selection step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Citoid(CitoidSelection),
    XPath(XPathSelection),
}

impl Selection {
    /// Build a selection from its definition.
    ///
    /// An empty config leaves the selection unconfigured.
    pub fn create(definition: &SelectionDefinition) -> ConfigResult<Self> {
        let config = definition.config.as_str();
        let configured = !config.trim().is_empty();

        match definition.kind.as_str() {
            "citoid" if configured => Ok(Selection::Citoid(CitoidSelection::new(config)?)),
            "citoid" => Ok(Selection::Citoid(CitoidSelection::unconfigured())),
            "xpath" if configured => Ok(Selection::XPath(XPathSelection::new(config)?)),
            "xpath" => Ok(Selection::XPath(XPathSelection::unconfigured())),
            other => Err(ConfigError::UnknownStepType {
                family: "selection",
                kind: other.to_string(),
            }),
        }
    }

    /// Type name used in definitions.
    pub fn kind(&self) -> &'static str {
        match self {
            Selection::Citoid(_) => "citoid",
            Selection::XPath(_) => "xpath",
        }
    }

    /// Config, if set.
    pub fn config(&self) -> Option<&str> {
        match self {
            Selection::Citoid(s) => s.field(),
            Selection::XPath(s) => s.expression(),
        }
    }

    /// Rebuild with a new config, validating it.
    pub fn with_config(&self, config: &str) -> ConfigResult<Self> {
        Self::create(&SelectionDefinition {
            kind: self.kind().to_string(),
            config: config.to_string(),
        })
    }

    /// Definition this selection round-trips to.
    pub fn to_definition(&self) -> SelectionDefinition {
        SelectionDefinition {
            kind: self.kind().to_string(),
            config: self.config().unwrap_or_default().to_string(),
        }
    }

    /// Read data about `target`.
    ///
    /// Goes through the webpage's shared caches; fetch failures propagate.
    pub async fn select(&self, target: &Webpage) -> Result<StepOutput> {
        let output = match self {
            Selection::Citoid(s) => s.select(target).await?,
            Selection::XPath(s) => s.select(target).await?,
        };
        debug!(
            kind = self.kind(),
            config = self.config().unwrap_or_default(),
            url = target.url(),
            output_len = output.len(),
            "Selection evaluated"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_services;
    use crate::types::citation::SimpleCitation;

    const URL: &str = "https://example.com/article";

    fn selection(kind: &str, config: &str) -> Selection {
        Selection::create(&SelectionDefinition {
            kind: kind.to_string(),
            config: config.to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_citoid_selection() {
        let (services, _, citoid) = mock_services();
        citoid.add_citation(
            URL,
            SimpleCitation::new()
                .with_value("title", "Sample article")
                .with_values("authorFirst", ["John", "Jane"]),
        );
        let page = Webpage::new(URL, &services).unwrap();

        assert_eq!(
            selection("citoid", "title").select(&page).await.unwrap(),
            vec!["Sample article"]
        );
        assert_eq!(
            selection("citoid", "authorFirst").select(&page).await.unwrap(),
            vec!["John", "Jane"]
        );
        assert!(selection("citoid", "DOI")
            .select(&page)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(citoid.call_count(URL), 1);
    }

    #[tokio::test]
    async fn test_xpath_selection() {
        let (services, fetcher, _) = mock_services();
        fetcher.add_page(
            URL,
            r#"<html><head><meta property="og:title" content="Sample article"></head>
               <body><span class="author">John</span><span class="author">Jane</span></body></html>"#,
        );
        let page = Webpage::new(URL, &services).unwrap();

        assert_eq!(
            selection("xpath", "//meta[@property='og:title']/@content")
                .select(&page)
                .await
                .unwrap(),
            vec!["Sample article"]
        );
        assert_eq!(
            selection("xpath", "//span[@class='author']")
                .select(&page)
                .await
                .unwrap(),
            vec!["John", "Jane"]
        );
        assert_eq!(fetcher.call_count(URL), 1);
    }

    #[test]
    fn test_invalid_configs() {
        let citoid = Selection::create(&SelectionDefinition {
            kind: "citoid".to_string(),
            config: "nonsense".to_string(),
        });
        assert!(matches!(
            citoid,
            Err(ConfigError::InvalidStepConfig { step: "citoid", .. })
        ));

        let xpath = Selection::create(&SelectionDefinition {
            kind: "xpath".to_string(),
            config: "//div[".to_string(),
        });
        assert!(matches!(
            xpath,
            Err(ConfigError::InvalidStepConfig { step: "xpath", .. })
        ));

        let unknown = Selection::create(&SelectionDefinition {
            kind: "css".to_string(),
            config: "div".to_string(),
        });
        assert!(matches!(unknown, Err(ConfigError::UnknownStepType { .. })));
    }

    #[tokio::test]
    async fn test_unconfigured_selection_fails() {
        let (services, _, _) = mock_services();
        let page = Webpage::new(URL, &services).unwrap();

        let err = selection("xpath", "").select(&page).await.unwrap_err();
        assert!(matches!(
            err,
            TranslationError::UndefinedConfig { step: "xpath" }
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let (services, _, _) = mock_services();
        let page = Webpage::new(URL, &services).unwrap();

        let err = selection("xpath", "//title").select(&page).await.unwrap_err();
        assert!(matches!(err, TranslationError::Fetch(_)));
    }

    #[test]
    fn test_round_trip() {
        let original = SelectionDefinition {
            kind: "xpath".to_string(),
            config: "//h1".to_string(),
        };
        assert_eq!(Selection::create(&original).unwrap().to_definition(), original);

        let rebuilt = selection("citoid", "title").with_config("date").unwrap();
        assert_eq!(rebuilt.config(), Some("date"));
    }
}
