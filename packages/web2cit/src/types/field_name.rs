//! Citation field names and their validation rules.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Zotero item types accepted by the `itemType` field.
pub const ITEM_TYPES: &[&str] = &[
    "artwork",
    "audioRecording",
    "bill",
    "blogPost",
    "book",
    "bookSection",
    "case",
    "computerProgram",
    "conferencePaper",
    "dictionaryEntry",
    "document",
    "email",
    "encyclopediaArticle",
    "film",
    "forumPost",
    "hearing",
    "instantMessage",
    "interview",
    "journalArticle",
    "letter",
    "magazineArticle",
    "manuscript",
    "map",
    "newspaperArticle",
    "patent",
    "podcast",
    "preprint",
    "presentation",
    "radioBroadcast",
    "report",
    "statute",
    "thesis",
    "tvBroadcast",
    "videoRecording",
    "webpage",
];

lazy_static! {
    static ref ITEM_TYPE_PATTERN: Regex =
        Regex::new(&format!("^({})$", ITEM_TYPES.join("|"))).unwrap();
    static ref NON_EMPTY_PATTERN: Regex = Regex::new(r"^.+$").unwrap();
    static ref DATE_PATTERN: Regex = Regex::new(r"^\d{4}(-\d{2}(-\d{2})?)?$").unwrap();
    static ref LANGUAGE_PATTERN: Regex = Regex::new(r"^[a-z]{2,3}(-[A-Za-z]{2,4})?$").unwrap();
    static ref ANY_PATTERN: Regex = Regex::new(r"^.*$").unwrap();
}

/// The fixed set of fields a template can define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    ItemType,
    Title,
    AuthorFirst,
    AuthorLast,
    Date,
    PublishedIn,
    PublishedBy,
    Language,
    Control,
}

impl FieldName {
    /// Every field name, in catalog order.
    pub const ALL: [FieldName; 9] = [
        FieldName::ItemType,
        FieldName::Title,
        FieldName::AuthorFirst,
        FieldName::AuthorLast,
        FieldName::Date,
        FieldName::PublishedIn,
        FieldName::PublishedBy,
        FieldName::Language,
        FieldName::Control,
    ];

    /// Name used in definitions and outputs.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::ItemType => "itemType",
            FieldName::Title => "title",
            FieldName::AuthorFirst => "authorFirst",
            FieldName::AuthorLast => "authorLast",
            FieldName::Date => "date",
            FieldName::PublishedIn => "publishedIn",
            FieldName::PublishedBy => "publishedBy",
            FieldName::Language => "language",
            FieldName::Control => "control",
        }
    }

    /// Whether the field holds several values.
    pub fn is_array(&self) -> bool {
        matches!(self, FieldName::AuthorFirst | FieldName::AuthorLast)
    }

    /// Whether the field can never be made optional.
    pub fn force_required(&self) -> bool {
        matches!(self, FieldName::ItemType | FieldName::Title)
    }

    /// Control fields gate template applicability but are left out of the citation.
    pub fn is_control(&self) -> bool {
        matches!(self, FieldName::Control)
    }

    /// Pattern every (trimmed) value must match.
    pub fn pattern(&self) -> &'static Regex {
        match self {
            FieldName::ItemType => &ITEM_TYPE_PATTERN,
            FieldName::Date => &DATE_PATTERN,
            FieldName::Language => &LANGUAGE_PATTERN,
            FieldName::Control => &ANY_PATTERN,
            FieldName::Title
            | FieldName::AuthorFirst
            | FieldName::AuthorLast
            | FieldName::PublishedIn
            | FieldName::PublishedBy => &NON_EMPTY_PATTERN,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for name in FieldName::ALL {
            assert_eq!(name.as_str().parse::<FieldName>().unwrap(), name);
        }
        assert!("author".parse::<FieldName>().is_err());
    }

    #[test]
    fn test_patterns() {
        assert!(FieldName::ItemType.pattern().is_match("journalArticle"));
        assert!(!FieldName::ItemType.pattern().is_match("article"));
        assert!(FieldName::Date.pattern().is_match("2022-01"));
        assert!(!FieldName::Date.pattern().is_match("January 2022"));
        assert!(FieldName::Language.pattern().is_match("pt-BR"));
        assert!(!FieldName::Title.pattern().is_match(""));
        assert!(FieldName::Control.pattern().is_match(""));
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_string(&FieldName::PublishedIn).unwrap();
        assert_eq!(json, "\"publishedIn\"");
    }
}
