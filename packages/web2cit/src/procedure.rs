//! Procedures: selections feeding a chain of transformations.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigResult, Result};
use crate::steps::{Selection, StepOutput, Transformation};
use crate::types::definitions::ProcedureDefinition;
use crate::types::webpage::Webpage;

/// Every intermediate output of one procedure run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureOutput {
    /// Output of each selection, in declaration order
    pub selections: Vec<StepOutput>,

    /// Selection outputs concatenated
    pub selection_output: StepOutput,

    /// Output after each transformation
    pub transformations: Vec<StepOutput>,

    /// Final output
    pub output: StepOutput,
}

/// An ordered set of selections and transformations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Procedure {
    selections: Vec<Selection>,
    transformations: Vec<Transformation>,
}

impl Procedure {
    pub fn new(selections: Vec<Selection>, transformations: Vec<Transformation>) -> Self {
        Self {
            selections,
            transformations,
        }
    }

    /// Build a procedure from its definition; any invalid step fails the whole.
    pub fn create(definition: &ProcedureDefinition) -> ConfigResult<Self> {
        let selections = definition
            .selections
            .iter()
            .map(Selection::create)
            .collect::<ConfigResult<Vec<_>>>()?;
        let transformations = definition
            .transformations
            .iter()
            .map(Transformation::create)
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self::new(selections, transformations))
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    pub fn to_definition(&self) -> ProcedureDefinition {
        ProcedureDefinition {
            selections: self.selections.iter().map(Selection::to_definition).collect(),
            transformations: self
                .transformations
                .iter()
                .map(Transformation::to_definition)
                .collect(),
        }
    }

    /// Run the procedure against `target`.
    ///
    /// Selections run concurrently and are concatenated in declaration
    /// order. If the transformations reduce a non-empty selection output to
    /// nothing, the raw selection output is returned instead.
    // TODO: drop the empty-output fallback once stored templates stop relying on it.
    pub async fn translate(&self, target: &Webpage) -> Result<ProcedureOutput> {
        let selections =
            try_join_all(self.selections.iter().map(|selection| selection.select(target)))
                .await?;
        let selection_output: StepOutput = selections.iter().flatten().cloned().collect();

        let mut transformations = Vec::with_capacity(self.transformations.len());
        let mut current = selection_output.clone();
        for transformation in &self.transformations {
            current = transformation.transform(current).await?;
            transformations.push(current.clone());
        }

        let output = if current.is_empty() && !selection_output.is_empty() {
            debug!(
                url = target.url(),
                "Transformations emptied the selection output, falling back to it"
            );
            selection_output.clone()
        } else {
            current
        };

        Ok(ProcedureOutput {
            selections,
            selection_output,
            transformations,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_services, MockCitoid, MockFetcher};
    use crate::types::citation::SimpleCitation;
    use crate::types::webpage::Services;
    use std::sync::Arc;
    use std::time::Duration;
    use crate::types::definitions::{SelectionDefinition, TransformationDefinition};

    const URL: &str = "https://example.com/article";

    fn select(kind: &str, config: &str) -> SelectionDefinition {
        SelectionDefinition {
            kind: kind.to_string(),
            config: config.to_string(),
        }
    }

    fn transform(kind: &str, config: &str) -> TransformationDefinition {
        TransformationDefinition {
            kind: kind.to_string(),
            config: config.to_string(),
            itemwise: None,
        }
    }

    fn webpage() -> Webpage {
        let (services, _, citoid) = mock_services();
        citoid.add_citation(
            URL,
            SimpleCitation::new()
                .with_value("title", "Sample article")
                .with_values("authorFirst", ["John", "Jane"]),
        );
        Webpage::new(URL, &services).unwrap()
    }

    #[tokio::test]
    async fn test_selections_then_transformations() {
        let procedure = Procedure::create(&ProcedureDefinition {
            selections: vec![select("citoid", "title"), select("citoid", "authorFirst")],
            transformations: vec![transform("range", "1,2,0"), transform("join", "")],
        })
        .unwrap();

        let output = procedure.translate(&webpage()).await.unwrap();

        assert_eq!(
            output.selections,
            vec![vec!["Sample article".to_string()], vec!["John".to_string(), "Jane".to_string()]]
        );
        assert_eq!(output.selection_output, vec!["Sample article", "John", "Jane"]);
        assert_eq!(output.transformations[0], vec!["John", "Jane", "Sample article"]);
        assert_eq!(output.output, vec!["John,Jane,Sample article"]);
    }

    #[tokio::test]
    async fn test_selections_concatenate_in_declaration_order() {
        let fetcher = Arc::new(
            MockFetcher::new().with_page(URL, "<html><body><h1>Heading</h1></body></html>"),
        );
        let citoid = Arc::new(
            MockCitoid::new()
                .with_citation(URL, SimpleCitation::new().with_value("title", "Citoid title"))
                .with_delay(Duration::from_millis(50)),
        );
        let page = Webpage::new(URL, &Services::new(fetcher, citoid)).unwrap();

        // The citoid selection is declared first but resolves last.
        let procedure = Procedure::create(&ProcedureDefinition {
            selections: vec![select("citoid", "title"), select("xpath", "//h1")],
            transformations: vec![],
        })
        .unwrap();

        let output = procedure.translate(&page).await.unwrap();
        assert_eq!(output.selection_output, vec!["Citoid title", "Heading"]);
        assert_eq!(output.output, vec!["Citoid title", "Heading"]);
    }

    #[tokio::test]
    async fn test_empty_transformation_falls_back_to_selection() {
        let procedure = Procedure::create(&ProcedureDefinition {
            selections: vec![select("citoid", "title")],
            transformations: vec![transform("range", "5")],
        })
        .unwrap();

        let output = procedure.translate(&webpage()).await.unwrap();
        assert_eq!(output.transformations, vec![Vec::<String>::new()]);
        assert_eq!(output.output, vec!["Sample article"]);
    }

    #[tokio::test]
    async fn test_empty_procedure() {
        let output = Procedure::default().translate(&webpage()).await.unwrap();
        assert!(output.output.is_empty());
        assert!(output.selections.is_empty());
    }

    #[test]
    fn test_invalid_step_fails_procedure() {
        let result = Procedure::create(&ProcedureDefinition {
            selections: vec![select("citoid", "title")],
            transformations: vec![transform("date", "klingon")],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_round_trip() {
        let definition = ProcedureDefinition {
            selections: vec![select("xpath", "//h1")],
            transformations: vec![TransformationDefinition {
                kind: "split".to_string(),
                config: " ".to_string(),
                itemwise: Some(true),
            }],
        };
        assert_eq!(
            Procedure::create(&definition).unwrap().to_definition(),
            definition
        );
    }
}
