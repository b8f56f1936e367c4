//! Transformation steps: pure rewrites of a step output.

use tracing::debug;

use crate::error::{ConfigError, ConfigResult, Result};
use crate::steps::date::{parse_date, DateLocale};
use crate::steps::range::RangeSpec;
use crate::steps::StepOutput;
use crate::types::definitions::TransformationDefinition;

const DEFAULT_SEPARATOR: &str = ",";

/// Joins items with a separator.
///
/// Whole-sequence by default: `["a", "b"]` becomes `["a,b"]`. Itemwise, each
/// item's characters are joined instead: `["ab"]` becomes `["a,b"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTransformation {
    separator: String,
    itemwise: bool,
}

impl JoinTransformation {
    /// Join with `separator`; empty means `,`.
    pub fn new(separator: &str, itemwise: bool) -> Self {
        Self {
            separator: separator_or_default(separator),
            itemwise,
        }
    }

    fn apply(&self, input: StepOutput) -> StepOutput {
        if self.itemwise {
            input
                .iter()
                .map(|item| {
                    item.chars()
                        .map(String::from)
                        .collect::<Vec<_>>()
                        .join(&self.separator)
                })
                .collect()
        } else {
            vec![input.join(&self.separator)]
        }
    }
}

/// Splits items on a separator.
///
/// Itemwise by default. When not itemwise, the sequence is first collapsed
/// into one comma-joined item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTransformation {
    separator: String,
    itemwise: bool,
}

impl SplitTransformation {
    /// Split on `separator`; empty means `,`.
    pub fn new(separator: &str, itemwise: bool) -> Self {
        Self {
            separator: separator_or_default(separator),
            itemwise,
        }
    }

    fn apply(&self, input: StepOutput) -> StepOutput {
        if input.is_empty() {
            return input;
        }
        let input = if self.itemwise {
            input
        } else {
            vec![input.join(DEFAULT_SEPARATOR)]
        };
        input
            .iter()
            .flat_map(|item| item.split(self.separator.as_str()).map(str::to_string))
            .collect()
    }
}

/// Normalizes free-form dates to ISO 8601; unparseable items pass through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTransformation {
    locale: DateLocale,
    itemwise: bool,
}

impl DateTransformation {
    /// Parse dates in `locale`; empty means `en`.
    pub fn new(locale: &str, itemwise: bool) -> ConfigResult<Self> {
        let locale = if locale.trim().is_empty() {
            DateLocale::default()
        } else {
            locale.trim().parse()?
        };
        Ok(Self { locale, itemwise })
    }

    /// Configured locale.
    pub fn locale(&self) -> DateLocale {
        self.locale
    }

    fn apply(&self, input: StepOutput) -> StepOutput {
        if input.is_empty() {
            return input;
        }
        let input = if self.itemwise {
            input
        } else {
            vec![input.join(DEFAULT_SEPARATOR)]
        };
        input
            .into_iter()
            .map(|item| parse_date(&item, self.locale).unwrap_or(item))
            .collect()
    }
}

/// Keeps the items at the configured index ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTransformation {
    config: String,
    ranges: Vec<RangeSpec>,
    itemwise: bool,
}

impl RangeTransformation {
    /// Parse `config` as a range list.
    pub fn new(config: &str, itemwise: bool) -> ConfigResult<Self> {
        Ok(Self {
            config: config.to_string(),
            ranges: RangeSpec::parse_list(config)?,
            itemwise,
        })
    }

    /// Parsed ranges.
    pub fn ranges(&self) -> &[RangeSpec] {
        &self.ranges
    }

    fn select(&self, input: &[String]) -> StepOutput {
        self.ranges
            .iter()
            .flat_map(|range| range.apply(input).cloned())
            .collect()
    }

    fn apply(&self, input: StepOutput) -> StepOutput {
        if self.itemwise {
            input
                .chunks(1)
                .flat_map(|item| self.select(item))
                .collect()
        } else {
            self.select(&input)
        }
    }
}

/// A transformation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    Join(JoinTransformation),
    Split(SplitTransformation),
    Date(DateTransformation),
    Range(RangeTransformation),
}

impl Transformation {
    /// Build a transformation from its definition.
    ///
    /// A missing `itemwise` takes the type's default: itemwise for split and
    /// date, whole-sequence for join and range.
    pub fn create(definition: &TransformationDefinition) -> ConfigResult<Self> {
        let config = definition.config.as_str();
        let itemwise = definition.itemwise;

        Ok(match definition.kind.as_str() {
            "join" => Transformation::Join(JoinTransformation::new(
                config,
                itemwise.unwrap_or(false),
            )),
            "split" => Transformation::Split(SplitTransformation::new(
                config,
                itemwise.unwrap_or(true),
            )),
            "date" => {
                Transformation::Date(DateTransformation::new(config, itemwise.unwrap_or(true))?)
            }
            "range" => Transformation::Range(RangeTransformation::new(
                config,
                itemwise.unwrap_or(false),
            )?),
            other => {
                return Err(ConfigError::UnknownStepType {
                    family: "transformation",
                    kind: other.to_string(),
                })
            }
        })
    }

    /// Type name used in definitions.
    pub fn kind(&self) -> &'static str {
        match self {
            Transformation::Join(_) => "join",
            Transformation::Split(_) => "split",
            Transformation::Date(_) => "date",
            Transformation::Range(_) => "range",
        }
    }

    /// Config string as it appears in definitions.
    pub fn config(&self) -> String {
        match self {
            Transformation::Join(t) => t.separator.clone(),
            Transformation::Split(t) => t.separator.clone(),
            Transformation::Date(t) => t.locale.to_string(),
            Transformation::Range(t) => t.config.clone(),
        }
    }

    /// Whether the rule applies per item.
    pub fn itemwise(&self) -> bool {
        match self {
            Transformation::Join(t) => t.itemwise,
            Transformation::Split(t) => t.itemwise,
            Transformation::Date(t) => t.itemwise,
            Transformation::Range(t) => t.itemwise,
        }
    }

    /// Rebuild with a new config, validating it.
    pub fn with_config(&self, config: &str) -> ConfigResult<Self> {
        Self::create(&TransformationDefinition {
            config: config.to_string(),
            ..self.to_definition()
        })
    }

    /// Rebuild with a new itemwise flag.
    pub fn with_itemwise(&self, itemwise: bool) -> ConfigResult<Self> {
        Self::create(&TransformationDefinition {
            itemwise: Some(itemwise),
            ..self.to_definition()
        })
    }

    /// Definition this transformation round-trips to.
    pub fn to_definition(&self) -> TransformationDefinition {
        TransformationDefinition {
            kind: self.kind().to_string(),
            config: self.config(),
            itemwise: Some(self.itemwise()),
        }
    }

    /// Apply the transformation.
    ///
    /// Pure and synchronous; async so every step shares one calling convention.
    pub async fn transform(&self, input: StepOutput) -> Result<StepOutput> {
        let input_len = input.len();
        let output = match self {
            Transformation::Join(t) => t.apply(input),
            Transformation::Split(t) => t.apply(input),
            Transformation::Date(t) => t.apply(input),
            Transformation::Range(t) => t.apply(input),
        };
        debug!(
            kind = self.kind(),
            input_len,
            output_len = output.len(),
            "Transformation applied"
        );
        Ok(output)
    }
}

fn separator_or_default(separator: &str) -> String {
    if separator.is_empty() {
        DEFAULT_SEPARATOR.to_string()
    } else {
        separator.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn transformation(kind: &str, config: &str, itemwise: Option<bool>) -> Transformation {
        Transformation::create(&TransformationDefinition {
            kind: kind.to_string(),
            config: config.to_string(),
            itemwise,
        })
        .unwrap()
    }

    fn run(t: &Transformation, input: &[&str]) -> Vec<String> {
        block_on(t.transform(strings(input))).unwrap()
    }

    #[test]
    fn test_join() {
        let join = transformation("join", "", None);
        assert_eq!(run(&join, &["a", "b", "c"]), strings(&["a,b,c"]));
        assert_eq!(run(&join, &[]), strings(&[""]));

        let itemwise = transformation("join", "-", Some(true));
        assert_eq!(run(&itemwise, &["ab", "cd"]), strings(&["a-b", "c-d"]));
    }

    #[test]
    fn test_split() {
        let split = transformation("split", " ", None);
        assert!(split.itemwise());
        assert_eq!(run(&split, &["a b", "c"]), strings(&["a", "b", "c"]));

        let whole = transformation("split", "", Some(false));
        assert_eq!(run(&whole, &["a,b", "c"]), strings(&["a", "b", "c"]));
        assert_eq!(run(&whole, &[]), Vec::<String>::new());
    }

    #[test]
    fn test_date() {
        let date = transformation("date", "en", None);
        assert_eq!(run(&date, &["January 27, 2022"]), strings(&["2022-01-27"]));
        assert_eq!(run(&date, &["January 2022"]), strings(&["2022-01"]));
        assert_eq!(run(&date, &["not a date"]), strings(&["not a date"]));
    }

    #[test]
    fn test_date_rejects_unsupported_locale() {
        let err = Transformation::create(&TransformationDefinition {
            kind: "date".to_string(),
            config: "klingon".to_string(),
            itemwise: None,
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedLocale("klingon".to_string()));
    }

    #[test]
    fn test_range() {
        let tail = transformation("range", "1:", Some(false));
        assert_eq!(run(&tail, &["a", "b", "c"]), strings(&["b", "c"]));

        let first = transformation("range", "0", Some(false));
        assert_eq!(run(&first, &["a", "b", "c"]), strings(&["a"]));

        let itemwise = transformation("range", "0", Some(true));
        assert_eq!(run(&itemwise, &["a", "b"]), strings(&["a", "b"]));

        let itemwise_skip = transformation("range", "1", Some(true));
        assert_eq!(run(&itemwise_skip, &["a", "b"]), Vec::<String>::new());
    }

    #[test]
    fn test_unknown_type() {
        let err = Transformation::create(&TransformationDefinition {
            kind: "uppercase".to_string(),
            config: String::new(),
            itemwise: None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStepType { .. }));
    }

    #[test]
    fn test_rebuild() {
        let range = transformation("range", "0", None);
        assert!(range.with_config("not a range").is_err());

        let rebuilt = range.with_config("1:").unwrap().with_itemwise(true).unwrap();
        assert_eq!(rebuilt.config(), "1:");
        assert!(rebuilt.itemwise());
        assert_eq!(
            rebuilt.to_definition(),
            TransformationDefinition {
                kind: "range".to_string(),
                config: "1:".to_string(),
                itemwise: Some(true),
            }
        );
    }
}
