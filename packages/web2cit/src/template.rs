//! Templates: the fields translated for one path of a domain.
//!
//! A [`Template`] is bound to one path. The [`FallbackTemplate`] has none and
//! is tried after every path template failed to apply.

use futures::future::join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult, Result, TranslationError};
use crate::field::{FieldOutput, TemplateField};
use crate::types::citation::Citation;
use crate::types::definitions::{
    FallbackTemplateDefinition, ProcedureDefinition, SelectionDefinition,
    TemplateDefinition, TemplateFieldDefinition, TransformationDefinition,
};
use crate::types::field_name::FieldName;
use crate::types::webpage::Webpage;

/// Result of translating a webpage with one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOutput {
    pub domain: String,

    /// `None` for the fallback template
    pub path: Option<String>,

    pub label: Option<String>,

    /// Output of each field, in template order
    pub fields: Vec<FieldOutput>,

    /// Every field applicable
    pub applicable: bool,

    /// Assembled from the valid non-control fields when applicable
    pub citation: Option<Citation>,
}

impl TemplateOutput {
    /// Output of the field named `name`.
    pub fn field(&self, name: FieldName) -> Option<&FieldOutput> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Fields keyed by name, in insertion order; later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldSet {
    fields: IndexMap<FieldName, TemplateField>,
}

impl FieldSet {
    fn from_fields(fields: impl IntoIterator<Item = TemplateField>) -> Self {
        let mut set = Self::default();
        for field in fields {
            set.insert(field);
        }
        set
    }

    fn from_definitions(definitions: &[TemplateFieldDefinition]) -> Self {
        Self::from_fields(definitions.iter().filter_map(|definition| {
            TemplateField::create(definition)
                .map_err(|e| {
                    warn!(field = %definition.fieldname, error = %e, "Skipping invalid template field");
                })
                .ok()
        }))
    }

    fn insert(&mut self, field: TemplateField) {
        if self.fields.contains_key(&field.name()) {
            warn!(field = %field.name(), "Duplicate template field ignored");
            return;
        }
        self.fields.insert(field.name(), field);
    }

    fn iter(&self) -> impl Iterator<Item = &TemplateField> {
        self.fields.values()
    }

    fn to_definitions(&self) -> Vec<TemplateFieldDefinition> {
        self.iter().map(TemplateField::to_definition).collect()
    }

    async fn translate(&self, target: &Webpage) -> Result<(Vec<FieldOutput>, bool, Option<Citation>)> {
        let fields = join_all(self.iter().map(|field| field.translate(target)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        let applicable = fields.iter().all(|f| f.applicable);
        let citation = applicable.then(|| {
            let mut citation = Citation::new(target.url());
            for field in fields.iter().filter(|f| f.valid && !f.control) {
                citation.apply(field.name, &field.values());
            }
            citation
        });

        Ok((fields, applicable, citation))
    }
}

/// A template bound to one path of a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    domain: String,
    path: String,
    label: Option<String>,
    fields: FieldSet,
}

impl Template {
    /// An empty template for `path`, which must be an absolute URL path.
    pub fn new(domain: impl Into<String>, path: impl Into<String>) -> ConfigResult<Self> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidPath(path));
        }
        Ok(Self {
            domain: domain.into().to_ascii_lowercase(),
            path,
            label: None,
            fields: FieldSet::default(),
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the fields; later duplicates of a name are dropped.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = TemplateField>) -> Self {
        self.fields = FieldSet::from_fields(fields);
        self
    }

    /// Build a template of `domain` from its definition.
    ///
    /// An invalid path is fatal; invalid fields are logged and skipped.
    pub fn create(domain: impl Into<String>, definition: &TemplateDefinition) -> ConfigResult<Self> {
        let mut template = Self::new(domain, definition.path.clone())?;
        template.label = definition.label.clone();
        template.fields = FieldSet::from_definitions(&definition.fields);
        Ok(template)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.fields.iter()
    }

    pub fn to_definition(&self) -> TemplateDefinition {
        TemplateDefinition {
            path: self.path.clone(),
            label: self.label.clone(),
            fields: self.fields.to_definitions(),
        }
    }

    /// Translate `target`, which must belong to the template's domain.
    pub async fn translate(&self, target: &Webpage) -> Result<TemplateOutput> {
        check_domain(&self.domain, target)?;

        let (fields, applicable, citation) = self.fields.translate(target).await?;
        debug!(
            domain = %self.domain,
            path = %self.path,
            target = target.url(),
            applicable,
            "Template translated"
        );

        Ok(TemplateOutput {
            domain: self.domain.clone(),
            path: Some(self.path.clone()),
            label: self.label.clone(),
            fields,
            applicable,
            citation,
        })
    }
}

/// The path-less template tried last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTemplate {
    domain: String,
    label: Option<String>,
    fields: FieldSet,
}

impl FallbackTemplate {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into().to_ascii_lowercase(),
            label: None,
            fields: FieldSet::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = TemplateField>) -> Self {
        self.fields = FieldSet::from_fields(fields);
        self
    }

    /// Build the fallback template of `domain`; invalid fields are skipped.
    pub fn create(domain: impl Into<String>, definition: &FallbackTemplateDefinition) -> Self {
        Self {
            domain: domain.into().to_ascii_lowercase(),
            label: definition.label.clone(),
            fields: FieldSet::from_definitions(&definition.fields),
        }
    }

    /// A fallback reproducing Citoid's own citation.
    ///
    /// Every field reads the Citoid key of the same name, except `publishedIn`
    /// (`publicationTitle`) and `publishedBy` (`publisher`). Dates are
    /// normalized.
    pub fn citoid_default(domain: impl Into<String>) -> Self {
        let field = |name: FieldName, key: &str| TemplateFieldDefinition {
            fieldname: name.to_string(),
            procedures: vec![ProcedureDefinition {
                selections: vec![SelectionDefinition {
                    kind: "citoid".to_string(),
                    config: key.to_string(),
                }],
                transformations: if name == FieldName::Date {
                    vec![TransformationDefinition {
                        kind: "date".to_string(),
                        config: String::new(),
                        itemwise: None,
                    }]
                } else {
                    vec![]
                },
            }],
            required: name.force_required(),
        };

        Self::create(
            domain,
            &FallbackTemplateDefinition {
                label: Some("Citoid".to_string()),
                fields: vec![
                    field(FieldName::ItemType, "itemType"),
                    field(FieldName::Title, "title"),
                    field(FieldName::AuthorFirst, "authorFirst"),
                    field(FieldName::AuthorLast, "authorLast"),
                    field(FieldName::Date, "date"),
                    field(FieldName::PublishedIn, "publicationTitle"),
                    field(FieldName::PublishedBy, "publisher"),
                    field(FieldName::Language, "language"),
                ],
            },
        )
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.fields.iter()
    }

    pub fn to_definition(&self) -> FallbackTemplateDefinition {
        FallbackTemplateDefinition {
            label: self.label.clone(),
            fields: self.fields.to_definitions(),
        }
    }

    pub async fn translate(&self, target: &Webpage) -> Result<TemplateOutput> {
        check_domain(&self.domain, target)?;

        let (fields, applicable, citation) = self.fields.translate(target).await?;
        debug!(
            domain = %self.domain,
            target = target.url(),
            applicable,
            "Fallback template translated"
        );

        Ok(TemplateOutput {
            domain: self.domain.clone(),
            path: None,
            label: self.label.clone(),
            fields,
            applicable,
            citation,
        })
    }
}

fn check_domain(domain: &str, target: &Webpage) -> Result<()> {
    if target.domain() != domain {
        return Err(TranslationError::CrossDomain {
            template_domain: domain.to_string(),
            target_domain: target.domain().to_string(),
        });
    }
    Ok(())
}
