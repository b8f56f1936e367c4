//! Citation types: the simplified Citoid citation read by selections and the
//! citation assembled from template output.

use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::field_name::FieldName;

/// Keys a citoid selection may read from a [`SimpleCitation`].
pub const SIMPLE_CITATION_FIELDS: &[&str] = &[
    "itemType",
    "title",
    "url",
    "abstractNote",
    "date",
    "accessDate",
    "language",
    "shortTitle",
    "publicationTitle",
    "websiteTitle",
    "blogTitle",
    "bookTitle",
    "encyclopediaTitle",
    "publisher",
    "place",
    "series",
    "edition",
    "volume",
    "issue",
    "pages",
    "section",
    "ISBN",
    "ISSN",
    "DOI",
    "PMID",
    "PMCID",
    "libraryCatalog",
    "rights",
    "extra",
    "tags",
    "authorFirst",
    "authorLast",
    "editorFirst",
    "editorLast",
    "contributorFirst",
    "contributorLast",
];

/// Creator lists in a Citoid response, as `[first, last]` pairs.
const CREATOR_KEYS: &[&str] = &["author", "editor", "contributor"];

/// A value in a simplified citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CitationValue {
    Single(String),
    Multiple(Vec<String>),
}

impl CitationValue {
    /// Values as a sequence; scalars become a one-element sequence.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            CitationValue::Single(value) => vec![value.clone()],
            CitationValue::Multiple(values) => values.clone(),
        }
    }
}

/// Citoid citation flattened to string and string-list values.
///
/// Creator pairs are split into `<role>First` / `<role>Last` lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimpleCitation {
    values: IndexMap<String, CitationValue>,
}

impl SimpleCitation {
    /// Create an empty citation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(key.into(), CitationValue::Single(value.into()));
        self
    }

    /// Set a list value.
    pub fn with_values(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.values.insert(
            key.into(),
            CitationValue::Multiple(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&CitationValue> {
        self.values.get(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the citation has no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Simplify one citation object in Citoid's `mediawiki` format.
    ///
    /// Strings and numbers become scalars, string arrays become lists,
    /// tag objects become a list of tag names, creator pairs are split.
    /// Anything else is dropped.
    pub fn from_mediawiki(citation: &Value) -> Self {
        let mut simple = Self::new();
        let Some(object) = citation.as_object() else {
            return simple;
        };

        for (key, value) in object {
            if CREATOR_KEYS.contains(&key.as_str()) {
                let (firsts, lasts) = split_creators(value);
                simple = simple
                    .with_values(format!("{}First", key), firsts)
                    .with_values(format!("{}Last", key), lasts);
                continue;
            }

            match value {
                Value::String(s) => simple = simple.with_value(key.as_str(), s.as_str()),
                Value::Number(n) => simple = simple.with_value(key.as_str(), n.to_string()),
                Value::Array(items) => {
                    let strings: Vec<String> = items
                        .iter()
                        .filter_map(|item| match item {
                            Value::String(s) => Some(s.clone()),
                            Value::Object(o) => {
                                o.get("tag").and_then(Value::as_str).map(str::to_string)
                            }
                            _ => None,
                        })
                        .collect();
                    simple = simple.with_values(key.as_str(), strings);
                }
                _ => {}
            }
        }

        simple
    }
}

fn split_creators(value: &Value) -> (Vec<String>, Vec<String>) {
    let mut firsts = Vec::new();
    let mut lasts = Vec::new();

    for creator in value.as_array().into_iter().flatten() {
        let part = |i: usize| {
            creator
                .get(i)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        firsts.push(part(0));
        lasts.push(part(1));
    }

    (firsts, lasts)
}

/// A creator of the cited work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub first: String,
    pub last: String,
}

/// Citation assembled from a template's field outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub item_type: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    pub date: Option<String>,
    pub published_in: Option<String>,
    pub published_by: Option<String>,
    pub language: Option<String>,
    pub url: String,
    pub access_date: NaiveDate,
}

impl Citation {
    /// Start an empty citation for `url`, accessed today.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            item_type: None,
            title: None,
            authors: Vec::new(),
            date: None,
            published_in: None,
            published_by: None,
            language: None,
            url: url.into(),
            access_date: Utc::now().date_naive(),
        }
    }

    /// Apply a validated field output to the citation.
    ///
    /// Author first and last names are zipped by position; whichever list is
    /// shorter is padded with empty strings. Control fields are ignored.
    pub fn apply(&mut self, name: FieldName, values: &[String]) {
        let first = values.first().cloned();
        match name {
            FieldName::ItemType => self.item_type = first,
            FieldName::Title => self.title = first,
            FieldName::Date => self.date = first,
            FieldName::PublishedIn => self.published_in = first,
            FieldName::PublishedBy => self.published_by = first,
            FieldName::Language => self.language = first,
            FieldName::AuthorFirst => self.set_author_names(values, |a, v| a.first = v),
            FieldName::AuthorLast => self.set_author_names(values, |a, v| a.last = v),
            FieldName::Control => {}
        }
    }

    fn set_author_names(&mut self, values: &[String], set: impl Fn(&mut Author, String)) {
        while self.authors.len() < values.len() {
            self.authors.push(Author {
                first: String::new(),
                last: String::new(),
            });
        }
        for (author, value) in self.authors.iter_mut().zip(values) {
            set(author, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_mediawiki_flattens_values() {
        let raw = json!({
            "itemType": "newspaperArticle",
            "title": "Sample article",
            "author": [["John", "Smith"], ["Jane", "Doe"]],
            "tags": [{"tag": "science", "type": 0}],
            "ISSN": ["1234-5678"],
            "pages": 12,
            "source": {"nested": true}
        });

        let simple = SimpleCitation::from_mediawiki(&raw);

        assert_eq!(
            simple.get("title"),
            Some(&CitationValue::Single("Sample article".to_string()))
        );
        assert_eq!(
            simple.get("authorFirst").unwrap().to_vec(),
            vec!["John".to_string(), "Jane".to_string()]
        );
        assert_eq!(
            simple.get("authorLast").unwrap().to_vec(),
            vec!["Smith".to_string(), "Doe".to_string()]
        );
        assert_eq!(simple.get("tags").unwrap().to_vec(), vec!["science".to_string()]);
        assert_eq!(simple.get("pages").unwrap().to_vec(), vec!["12".to_string()]);
        assert!(simple.get("source").is_none());
    }

    #[test]
    fn test_apply_zips_authors() {
        let mut citation = Citation::new("https://example.com/a");
        citation.apply(FieldName::AuthorLast, &["Smith".to_string(), "Doe".to_string()]);
        citation.apply(FieldName::AuthorFirst, &["John".to_string()]);
        citation.apply(FieldName::Title, &["Title".to_string()]);
        citation.apply(FieldName::Control, &["ignored".to_string()]);

        assert_eq!(citation.authors.len(), 2);
        assert_eq!(citation.authors[0].first, "John");
        assert_eq!(citation.authors[0].last, "Smith");
        assert_eq!(citation.authors[1].first, "");
        assert_eq!(citation.authors[1].last, "Doe");
        assert_eq!(citation.title.as_deref(), Some("Title"));
    }
}
