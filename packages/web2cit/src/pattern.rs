//! Path patterns: labelled globs that sort URL paths into groups.
//!
//! Globs follow shell rules over `/`-separated paths: `*` stays within one
//! segment and `**` spans any number of segments.
//!
//! ```text
//! /article/*      matches /article/1, not /article/1/comments
//! /article/**     matches both
//! /**             matches every path
//! ```
//!
//! Within a [`PatternSet`] the first matching pattern claims a path.

use glob::MatchOptions;
use indexmap::IndexMap;
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};
use crate::types::definitions::PatternDefinition;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled glob over URL paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    glob: glob::Pattern,
    label: Option<String>,
}

impl Pattern {
    /// Compile `pattern`.
    pub fn new(pattern: &str) -> ConfigResult<Self> {
        let glob = glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.msg.to_string(),
        })?;
        Ok(Self { glob, label: None })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn create(definition: &PatternDefinition) -> ConfigResult<Self> {
        let pattern = Self::new(&definition.pattern)?;
        Ok(Self {
            label: definition.label.clone(),
            ..pattern
        })
    }

    pub fn as_str(&self) -> &str {
        self.glob.as_str()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether the normalized `path` matches.
    pub fn matches(&self, path: &str) -> bool {
        self.glob.matches_with(&normalize_path(path), MATCH_OPTIONS)
    }

    pub fn to_definition(&self) -> PatternDefinition {
        PatternDefinition {
            pattern: self.as_str().to_string(),
            label: self.label.clone(),
        }
    }
}

/// Normalize a URL path for matching.
///
/// Drops the query string and resolves `.` and `..` segments. Duplicate
/// slashes are kept.
pub fn normalize_path(path: &str) -> String {
    let path = path.split('?').next().unwrap_or_default();
    let parts: Vec<&str> = path.split('/').collect();
    let last = parts.len() - 1;

    let mut segments: Vec<&str> = Vec::with_capacity(parts.len());
    for (i, part) in parts.into_iter().enumerate() {
        match part {
            "." => {}
            ".." => {
                // Never pop the root
                if segments.len() > 1 {
                    segments.pop();
                }
            }
            segment => {
                segments.push(segment);
                continue;
            }
        }
        if i == last {
            segments.push("");
        }
    }

    let normalized = segments.join("/");
    if normalized.starts_with('/') {
        normalized
    } else {
        format!("/{}", normalized)
    }
}

/// Ordered patterns; first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from definitions, skipping invalid and duplicate patterns.
    pub fn from_definitions(definitions: &[PatternDefinition]) -> Self {
        let mut set = Self::new();
        for definition in definitions {
            match Pattern::create(definition) {
                Ok(pattern) => set.push(pattern),
                Err(e) => warn!(pattern = %definition.pattern, error = %e, "Skipping invalid pattern"),
            }
        }
        set
    }

    /// Append `pattern` unless an identical glob is already present.
    pub fn push(&mut self, pattern: Pattern) {
        if self.get(pattern.as_str()).is_some() {
            warn!(pattern = pattern.as_str(), "Duplicate pattern ignored");
            return;
        }
        self.patterns.push(pattern);
    }

    /// Pattern with glob text `pattern`.
    pub fn get(&self, pattern: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.as_str() == pattern)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First pattern matching `path`.
    pub fn match_path(&self, path: &str) -> Option<&Pattern> {
        let normalized = normalize_path(path);
        self.patterns
            .iter()
            .find(|p| p.glob.matches_with(&normalized, MATCH_OPTIONS))
    }

    /// Group `paths` under their first matching pattern.
    ///
    /// Every pattern appears as a key, in set order. Paths no pattern
    /// matches are left out.
    pub fn sort_paths<'a>(
        &self,
        paths: impl IntoIterator<Item = &'a str>,
    ) -> IndexMap<String, Vec<String>> {
        let mut groups: IndexMap<String, Vec<String>> = self
            .patterns
            .iter()
            .map(|p| (p.as_str().to_string(), Vec::new()))
            .collect();

        for path in paths {
            if let Some(pattern) = self.match_path(path) {
                if let Some(group) = groups.get_mut(pattern.as_str()) {
                    group.push(path.to_string());
                }
            }
        }
        groups
    }

    pub fn to_definitions(&self) -> Vec<PatternDefinition> {
        self.patterns.iter().map(Pattern::to_definition).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(patterns: &[&str]) -> PatternSet {
        let mut set = PatternSet::new();
        for pattern in patterns {
            set.push(Pattern::new(pattern).unwrap());
        }
        set
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/a/b?x=1"), "/a/b");
        assert_eq!(normalize_path("/a/./b"), "/a/b");
        assert_eq!(normalize_path("/a/b/../c"), "/a/c");
        assert_eq!(normalize_path("/a/b/.."), "/a/");
        assert_eq!(normalize_path("/.."), "/");
        assert_eq!(normalize_path("/a//b"), "/a//b");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_glob_semantics() {
        let single = Pattern::new("/article/*").unwrap();
        assert!(single.matches("/article/1"));
        assert!(single.matches("/article/1?page=2"));
        assert!(!single.matches("/article/1/comments"));

        let recursive = Pattern::new("/article/**").unwrap();
        assert!(recursive.matches("/article/1/comments"));

        let all = Pattern::new("/**").unwrap();
        assert!(all.matches("/"));
        assert!(all.matches("/a/b/c"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            Pattern::new("/article/[").unwrap_err(),
            ConfigError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_first_match_wins() {
        let patterns = set(&["/article/*", "/article/**", "/**"]);
        assert_eq!(patterns.match_path("/article/1").unwrap().as_str(), "/article/*");
        assert_eq!(
            patterns.match_path("/article/1/2").unwrap().as_str(),
            "/article/**"
        );
        assert_eq!(patterns.match_path("/about").unwrap().as_str(), "/**");
    }

    #[test]
    fn test_sort_paths() {
        let patterns = set(&["/article/*", "/news/**"]);
        let groups = patterns.sort_paths(["/article/1", "/news/a/b", "/about", "/article/2"]);

        assert_eq!(
            groups.keys().collect::<Vec<_>>(),
            vec!["/article/*", "/news/**"]
        );
        assert_eq!(groups["/article/*"], vec!["/article/1", "/article/2"]);
        assert_eq!(groups["/news/**"], vec!["/news/a/b"]);
        assert!(groups.get("/**").is_none());
    }

    #[test]
    fn test_from_definitions_skips_bad_entries() {
        let definitions = vec![
            PatternDefinition {
                pattern: "/article/*".to_string(),
                label: Some("Articles".to_string()),
            },
            PatternDefinition {
                pattern: "/article/*".to_string(),
                label: None,
            },
            PatternDefinition {
                pattern: "/[".to_string(),
                label: None,
            },
        ];
        let patterns = PatternSet::from_definitions(&definitions);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns.to_definitions(), definitions[..1].to_vec());
    }

    proptest! {
        #[test]
        fn prop_sort_paths_partitions(paths in proptest::collection::vec("(/[ab]{1,2}){0,3}", 0..12)) {
            let patterns = set(&["/a/*", "/a/**", "/b*", "/*/b"]);
            let groups = patterns.sort_paths(paths.iter().map(String::as_str));

            let matched: Vec<&String> = paths
                .iter()
                .filter(|p| patterns.match_path(p).is_some())
                .collect();
            prop_assert_eq!(groups.values().map(Vec::len).sum::<usize>(), matched.len());

            for (pattern, group) in &groups {
                for path in group {
                    let first = patterns.match_path(path).map(Pattern::as_str);
                    prop_assert_eq!(first, Some(pattern.as_str()));
                }
            }
        }
    }
}
