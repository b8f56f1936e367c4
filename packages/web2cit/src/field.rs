//! Template fields: one citation attribute and the procedures that fill it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ConfigResult, Result};
use crate::procedure::{Procedure, ProcedureOutput};
use crate::steps::StepOutput;
use crate::types::definitions::TemplateFieldDefinition;
use crate::types::field_name::FieldName;
use crate::types::webpage::Webpage;

/// Result of translating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutput {
    pub name: FieldName,

    /// Output of each procedure, in declaration order
    pub procedures: Vec<ProcedureOutput>,

    /// Validated values; `None` where a value did not match the field pattern
    pub output: Vec<Option<String>>,

    /// Output is non-empty and every value matched
    pub valid: bool,

    /// Valid, or not required
    pub applicable: bool,

    /// Control fields are left out of the citation
    pub control: bool,
}

impl FieldOutput {
    /// Valid values only.
    pub fn values(&self) -> Vec<String> {
        self.output.iter().flatten().cloned().collect()
    }
}

/// A named citation attribute within a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateField {
    name: FieldName,
    required: bool,
    procedures: Vec<Procedure>,
}

impl TemplateField {
    /// An empty field; force-required fields start required.
    pub fn new(name: FieldName) -> Self {
        Self {
            name,
            required: name.force_required(),
            procedures: Vec::new(),
        }
    }

    pub fn with_procedures(mut self, procedures: Vec<Procedure>) -> Self {
        self.procedures = procedures;
        self
    }

    /// Build a field from its definition.
    pub fn create(definition: &TemplateFieldDefinition) -> ConfigResult<Self> {
        let name: FieldName = definition.fieldname.parse()?;

        let required = if name.force_required() && !definition.required {
            warn!(field = %name, "Field is always required, ignoring required = false");
            true
        } else {
            definition.required
        };

        let procedures = definition
            .procedures
            .iter()
            .map(Procedure::create)
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            name,
            required,
            procedures,
        })
    }

    pub fn name(&self) -> FieldName {
        self.name
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }

    /// Rebuild with a new required flag.
    ///
    /// Fails for force-required fields when `required` is false.
    pub fn with_required(&self, required: bool) -> ConfigResult<Self> {
        if self.name.force_required() && !required {
            return Err(ConfigError::ForceRequired(self.name.as_str()));
        }
        Ok(Self {
            required,
            ..self.clone()
        })
    }

    pub fn to_definition(&self) -> TemplateFieldDefinition {
        TemplateFieldDefinition {
            fieldname: self.name.to_string(),
            procedures: self.procedures.iter().map(Procedure::to_definition).collect(),
            required: self.required,
        }
    }

    /// Check `output` against the field's arity and pattern.
    ///
    /// Scalar fields collapse several values into one comma-joined value.
    /// Values are trimmed; those not matching the pattern become `None`.
    pub fn check(&self, output: &[String]) -> Vec<Option<String>> {
        let values = if !self.name.is_array() && output.len() > 1 {
            vec![output.join(",")]
        } else {
            output.to_vec()
        };

        let pattern = self.name.pattern();
        values
            .into_iter()
            .map(|value| {
                let value = value.trim();
                pattern.is_match(value).then(|| value.to_string())
            })
            .collect()
    }

    /// Whether `output` is non-empty and every value matches.
    pub fn validate(&self, output: &[String]) -> bool {
        is_valid(&self.check(output))
    }

    /// Run every procedure against `target` and validate the combined output.
    pub async fn translate(&self, target: &Webpage) -> Result<FieldOutput> {
        let mut procedures = Vec::with_capacity(self.procedures.len());
        for procedure in &self.procedures {
            procedures.push(procedure.translate(target).await?);
        }

        let combined: StepOutput = procedures
            .iter()
            .flat_map(|p| p.output.iter().cloned())
            .collect();
        let output = self.check(&combined);
        let valid = is_valid(&output);

        Ok(FieldOutput {
            name: self.name,
            procedures,
            output,
            valid,
            applicable: valid || !self.required,
            control: self.name.is_control(),
        })
    }
}

fn is_valid(output: &[Option<String>]) -> bool {
    !output.is_empty() && output.iter().all(Option::is_some)
}
