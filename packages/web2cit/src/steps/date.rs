//! Free-form date parsing for the date transformation.
//!
//! Dates are read in a configured locale and written as ISO 8601 with the
//! precision the input carried: `yyyy-mm-dd`, `yyyy-mm` or `yyyy`.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

lazy_static! {
    static ref ISO_DATE: Regex =
        Regex::new(r"^(\d{4})-(\d{1,2})(?:-(\d{1,2}))?(?:[T ].*)?$").unwrap();
    static ref TIME_OF_DAY: Regex =
        Regex::new(r"(?i)\b\d{1,2}:\d{2}(?::\d{2})?(?:\.\d+)?\s*(?:[ap]\.?m\.?)?(?:\s*[+-]\d{2}:?\d{2})?")
            .unwrap();
}

const ORDINAL_SUFFIXES: &[&str] = &["st", "nd", "rd", "th", "er", "e", "o", "a", "º", "ª"];

/// Locales the date transformation understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateLocale {
    #[default]
    En,
    Es,
    Pt,
    Fr,
    De,
    It,
}

impl DateLocale {
    /// Every supported locale.
    pub const ALL: [DateLocale; 6] = [
        DateLocale::En,
        DateLocale::Es,
        DateLocale::Pt,
        DateLocale::Fr,
        DateLocale::De,
        DateLocale::It,
    ];

    /// Locale code used in configs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DateLocale::En => "en",
            DateLocale::Es => "es",
            DateLocale::Pt => "pt",
            DateLocale::Fr => "fr",
            DateLocale::De => "de",
            DateLocale::It => "it",
        }
    }

    fn months(&self) -> &'static [&'static str; 12] {
        match self {
            DateLocale::En => &[
                "january", "february", "march", "april", "may", "june", "july", "august",
                "september", "october", "november", "december",
            ],
            DateLocale::Es => &[
                "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto",
                "septiembre", "octubre", "noviembre", "diciembre",
            ],
            DateLocale::Pt => &[
                "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto",
                "setembro", "outubro", "novembro", "dezembro",
            ],
            DateLocale::Fr => &[
                "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
                "septembre", "octobre", "novembre", "décembre",
            ],
            DateLocale::De => &[
                "januar", "februar", "märz", "april", "mai", "juni", "juli", "august",
                "september", "oktober", "november", "dezember",
            ],
            DateLocale::It => &[
                "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
                "settembre", "ottobre", "novembre", "dicembre",
            ],
        }
    }

    /// Words that may appear in a date without carrying date information.
    fn filler(&self) -> &'static [&'static str] {
        match self {
            DateLocale::En => &[
                "of", "the", "on", "at", "utc", "gmt", "am", "pm", "monday", "tuesday",
                "wednesday", "thursday", "friday", "saturday", "sunday", "mon", "tue", "wed",
                "thu", "fri", "sat", "sun",
            ],
            DateLocale::Es => &[
                "de", "del", "el", "a", "las", "lunes", "martes", "miércoles", "jueves",
                "viernes", "sábado", "domingo",
            ],
            DateLocale::Pt => &[
                "de", "do", "em", "segunda", "terça", "quarta", "quinta", "sexta", "feira",
                "sábado", "domingo",
            ],
            DateLocale::Fr => &[
                "le", "du", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
                "dimanche",
            ],
            DateLocale::De => &[
                "den", "am", "um", "uhr", "montag", "dienstag", "mittwoch", "donnerstag",
                "freitag", "samstag", "sonntag",
            ],
            DateLocale::It => &[
                "il", "del", "di", "lunedì", "martedì", "mercoledì", "giovedì", "venerdì",
                "sabato", "domenica",
            ],
        }
    }

    /// Whether numeric dates put the month first (`01/27/2022`).
    fn month_first(&self) -> bool {
        matches!(self, DateLocale::En)
    }

    /// Month number for a full or abbreviated (3+ letters) month name.
    fn month(&self, word: &str) -> Option<u32> {
        let months = self.months();
        if let Some(i) = months.iter().position(|m| *m == word) {
            return Some(i as u32 + 1);
        }
        if word.chars().count() >= 3 {
            if let Some(i) = months.iter().position(|m| m.starts_with(word)) {
                return Some(i as u32 + 1);
            }
        }
        None
    }
}

impl fmt::Display for DateLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateLocale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateLocale::ALL
            .iter()
            .copied()
            .find(|locale| locale.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedLocale(s.to_string()))
    }
}

/// A number token and how many digits it had.
#[derive(Debug, Clone, Copy)]
struct Number {
    value: u32,
    digits: usize,
}

impl Number {
    fn is_year(&self) -> bool {
        self.digits == 4
    }
}

/// Parse `text` as a date in `locale`.
///
/// Returns `None` when the text does not read as a date.
pub fn parse_date(text: &str, locale: DateLocale) -> Option<String> {
    let text = text.trim();

    if let Some(caps) = ISO_DATE.captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps.get(3).and_then(|d| d.as_str().parse().ok());
        return format_date(year, Some(month), day);
    }

    let text = TIME_OF_DAY.replace_all(text, " ").to_lowercase();

    let mut numbers = Vec::new();
    let mut month_name = None;

    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let digits: String = token.chars().take_while(char::is_ascii_digit).collect();
        if !digits.is_empty() {
            let suffix = &token[digits.len()..];
            if !suffix.is_empty() && !ORDINAL_SUFFIXES.contains(&suffix) {
                return None;
            }
            if digits.len() > 4 {
                return None;
            }
            numbers.push(Number {
                value: digits.parse().ok()?,
                digits: digits.len(),
            });
        } else if let Some(month) = locale.month(token) {
            if month_name.replace(month).is_some() {
                return None;
            }
        } else if !locale.filler().contains(&token) {
            return None;
        }
    }

    match month_name {
        Some(month) => from_named_month(month, &numbers),
        None => from_numbers(&numbers, locale),
    }
}

fn from_named_month(month: u32, numbers: &[Number]) -> Option<String> {
    let year = numbers.iter().find(|n| n.is_year())?;
    let others: Vec<&Number> = numbers.iter().filter(|n| !n.is_year()).collect();

    match others.as_slice() {
        [] => format_date(year.value as i32, Some(month), None),
        [day] if day.digits <= 2 => format_date(year.value as i32, Some(month), Some(day.value)),
        _ => None,
    }
}

fn from_numbers(numbers: &[Number], locale: DateLocale) -> Option<String> {
    match numbers {
        [year] if year.is_year() => format_date(year.value as i32, None, None),
        [year, month] if year.is_year() && month.digits <= 2 => {
            format_date(year.value as i32, Some(month.value), None)
        }
        [month, year] if year.is_year() && month.digits <= 2 => {
            format_date(year.value as i32, Some(month.value), None)
        }
        [year, month, day] if year.is_year() && month.digits <= 2 && day.digits <= 2 => {
            format_date(year.value as i32, Some(month.value), Some(day.value))
        }
        [a, b, year] if year.is_year() && a.digits <= 2 && b.digits <= 2 => {
            let (mut month, mut day) = if locale.month_first() {
                (a.value, b.value)
            } else {
                (b.value, a.value)
            };
            if month > 12 && day <= 12 {
                std::mem::swap(&mut month, &mut day);
            }
            format_date(year.value as i32, Some(month), Some(day))
        }
        _ => None,
    }
}

fn format_date(year: i32, month: Option<u32>, day: Option<u32>) -> Option<String> {
    match (month, day) {
        (Some(month), Some(day)) => {
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            Some(date.format("%Y-%m-%d").to_string())
        }
        (Some(month), None) => {
            NaiveDate::from_ymd_opt(year, month, 1)?;
            Some(format!("{:04}-{:02}", year, month))
        }
        _ => Some(format!("{:04}", year)),
    }
}
