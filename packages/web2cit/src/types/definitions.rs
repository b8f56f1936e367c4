//! Declarative JSON shapes for stored configuration.
//!
//! Field names are part of the storage format and must not change.

use serde::{Deserialize, Serialize};

/// A selection step: `{ "type": "xpath", "config": "//title" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: String,
}

/// A transformation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: String,
    /// Missing means the transformation type's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itemwise: Option<bool>,
}

/// Selections feeding a chain of transformations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDefinition {
    #[serde(default)]
    pub selections: Vec<SelectionDefinition>,
    #[serde(default)]
    pub transformations: Vec<TransformationDefinition>,
}

/// One field of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFieldDefinition {
    pub fieldname: String,
    #[serde(default)]
    pub procedures: Vec<ProcedureDefinition>,
    #[serde(default)]
    pub required: bool,
}

/// A template bound to one path of a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: Vec<TemplateFieldDefinition>,
}

/// The path-less template tried after all others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackTemplateDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: Vec<TemplateFieldDefinition>,
}

/// A labelled glob over URL paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Expected output of one field for a test path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFieldDefinition {
    pub fieldname: String,
    #[serde(default)]
    pub goal: Vec<String>,
}

/// Expected citation fields for one path, used to score translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    pub path: String,
    #[serde(default)]
    pub fields: Vec<TestFieldDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_definition_shape() {
        let value = json!({
            "path": "/article/1",
            "fields": [{
                "fieldname": "title",
                "required": true,
                "procedures": [{
                    "selections": [{"type": "xpath", "config": "//h1"}],
                    "transformations": [{"type": "join", "config": " ", "itemwise": false}]
                }]
            }]
        });

        let definition: TemplateDefinition = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(definition.path, "/article/1");
        assert_eq!(definition.label, None);
        assert_eq!(definition.fields[0].procedures[0].selections[0].kind, "xpath");
        assert_eq!(
            definition.fields[0].procedures[0].transformations[0].itemwise,
            Some(false)
        );

        assert_eq!(serde_json::to_value(&definition).unwrap(), value);
    }

    #[test]
    fn test_pattern_definition_label_optional() {
        let definition: PatternDefinition =
            serde_json::from_value(json!({"pattern": "/news/*"})).unwrap();
        assert_eq!(definition.pattern, "/news/*");
        assert!(definition.label.is_none());
    }
}
