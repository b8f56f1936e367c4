//! Index range syntax for the range transformation.
//!
//! A config is a comma-separated list of `start:end` items over 0-based
//! indices. Both bounds are optional and `end` is inclusive:
//!
//! - `2` - index 2 only
//! - `1:` - index 1 to the last index
//! - `:3` - indices 0 to 3
//! - `1,2,0` - indices 1, 2 and 0, in that order

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ConfigError, ConfigResult};

lazy_static! {
    static ref RANGE_ITEM: Regex = Regex::new(r"^\s*(\d*)\s*(?::\s*(\d*)\s*)?$").unwrap();
}

/// Upper bound of a range item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// No colon: the item selects only its start index
    Single,
    /// Colon without end: up to the last index
    Last,
    /// Explicit inclusive end
    Index(usize),
}

/// One `start:end` item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: usize,
    pub end: RangeBound,
}

impl RangeSpec {
    /// Parse a full range config.
    pub fn parse_list(config: &str) -> ConfigResult<Vec<RangeSpec>> {
        let invalid = |reason: &str| ConfigError::InvalidStepConfig {
            step: "range",
            config: config.to_string(),
            reason: reason.to_string(),
        };

        if config.trim().is_empty() {
            return Err(invalid("expected at least one range"));
        }

        config
            .split(',')
            .map(|item| {
                let caps = RANGE_ITEM
                    .captures(item)
                    .ok_or_else(|| invalid(&format!("malformed range {:?}", item.trim())))?;
                let start_text = &caps[1];
                let has_colon = item.contains(':');
                let end_text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

                if !has_colon && start_text.is_empty() {
                    return Err(invalid("empty range"));
                }

                let index = |text: &str| {
                    text.parse::<usize>()
                        .map_err(|_| invalid(&format!("index {:?} out of range", text)))
                };
                let start = if start_text.is_empty() {
                    0
                } else {
                    index(start_text)?
                };
                let end = match (has_colon, end_text.is_empty()) {
                    (false, _) => RangeBound::Single,
                    (true, true) => RangeBound::Last,
                    (true, false) => RangeBound::Index(index(end_text)?),
                };

                Ok(RangeSpec { start, end })
            })
            .collect()
    }

    /// Items of `input` this range selects, in index order.
    ///
    /// Indices past the end of `input` are skipped.
    pub fn apply<'a>(&self, input: &'a [String]) -> impl Iterator<Item = &'a String> + 'a {
        let last = input.len().checked_sub(1);
        let end = match self.end {
            RangeBound::Single => Some(self.start),
            RangeBound::Last => last,
            RangeBound::Index(end) => Some(end),
        };
        let end = end.map(|end| end.min(last.unwrap_or(0)));

        let range = match (end, last) {
            (Some(end), Some(_)) if self.start <= end => self.start..end + 1,
            _ => 0..0,
        };
        input[range].iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn select(config: &str, input: &[&str]) -> Vec<String> {
        let input = strings(input);
        RangeSpec::parse_list(config)
            .unwrap()
            .iter()
            .flat_map(|range| range.apply(&input).cloned().collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            RangeSpec::parse_list("1, 2:4, :3, 5:").unwrap(),
            vec![
                RangeSpec { start: 1, end: RangeBound::Single },
                RangeSpec { start: 2, end: RangeBound::Index(4) },
                RangeSpec { start: 0, end: RangeBound::Index(3) },
                RangeSpec { start: 5, end: RangeBound::Last },
            ]
        );
    }

    #[test]
    fn test_parse_invalid() {
        for config in ["", "a", "1:2:3", "-1", "1,,2", "1;2"] {
            assert!(RangeSpec::parse_list(config).is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_apply() {
        assert_eq!(select("1:", &["a", "b", "c"]), strings(&["b", "c"]));
        assert_eq!(select("0", &["a", "b", "c"]), strings(&["a"]));
        assert_eq!(select(":", &["a", "b", "c"]), strings(&["a", "b", "c"]));
        assert_eq!(select("1,2,0", &["a", "b", "c"]), strings(&["b", "c", "a"]));
        assert_eq!(select("1:10", &["a", "b", "c"]), strings(&["b", "c"]));
        assert_eq!(select("5", &["a", "b", "c"]), Vec::<String>::new());
        assert_eq!(select("2:1", &["a", "b", "c"]), Vec::<String>::new());
        assert_eq!(select("0:", &[]), Vec::<String>::new());
    }
}
