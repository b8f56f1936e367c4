//! HTML parsing and XPath evaluation.
//!
//! Parsing goes through `sxd_html`, evaluation through `sxd_xpath`. The DOM
//! (`sxd_document::Package`) is neither `Send` nor `Sync`; keep it inside a
//! synchronous scope and never hold it across an `.await`.

use lazy_static::lazy_static;
use regex::Regex;
use sxd_document::dom::{ChildOfElement, Element};
use sxd_document::Package;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{evaluate_xpath, Value};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Descendants whose content never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that render on a line of their own.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "caption", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "title", "tr", "ul",
];

/// Parse an HTML document.
pub fn parse_html(body: &str) -> Package {
    sxd_html::parse_html(body)
}

/// Check that `expression` is a valid XPath expression.
///
/// Evaluates it against an empty document, which surfaces syntax errors
/// and unknown functions without touching any page.
pub fn validate_xpath(expression: &str) -> Result<(), String> {
    let package = Package::new();
    let document = package.as_document();
    evaluate_xpath(&document, expression)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Evaluate `expression` against `package` and render the result as strings.
///
/// Node sets are visited in document order. Element nodes yield their
/// rendered text (see [`rendered_text`]) and attribute nodes their value.
/// Other nodes yield their text and are dropped when it is blank. Scalar
/// results yield one string.
pub fn select(package: &Package, expression: &str) -> Result<Vec<String>, String> {
    let document = package.as_document();
    let value = evaluate_xpath(&document, expression).map_err(|e| e.to_string())?;

    let output = match value {
        Value::Nodeset(nodes) => nodes
            .document_order()
            .into_iter()
            .filter_map(|node| match node {
                Node::Element(element) => Some(rendered_text(element)),
                Node::Attribute(attribute) => Some(attribute.value().to_string()),
                other => {
                    let text = collapse_whitespace(&other.string_value());
                    (!text.is_empty()).then_some(text)
                }
            })
            .collect(),
        Value::Number(n) => vec![format_number(n)],
        Value::String(s) => vec![s],
        Value::Boolean(b) => vec![b.to_string()],
    };

    Ok(output)
}

/// Text of `element` as a browser renders it, whitespace collapsed.
///
/// Hidden descendants (`script`, `style`, ...) are skipped, and `br` and
/// block-level boundaries separate words. A hidden element that is itself
/// selected yields its raw text, so `//script` still reads JSON-LD.
pub fn rendered_text(element: Element<'_>) -> String {
    let mut text = String::new();
    push_children(element, &mut text);
    collapse_whitespace(&text)
}

fn push_children(element: Element<'_>, out: &mut String) {
    for child in element.children() {
        match child {
            ChildOfElement::Element(child) => push_rendered(child, out),
            ChildOfElement::Text(text) => out.push_str(text.text()),
            _ => {}
        }
    }
}

fn push_rendered(element: Element<'_>, out: &mut String) {
    let name = element.name().local_part().to_ascii_lowercase();
    if HIDDEN_ELEMENTS.contains(&name.as_str()) {
        return;
    }
    if name == "br" {
        out.push(' ');
        return;
    }

    let block = BLOCK_ELEMENTS.contains(&name.as_str());
    if block {
        out.push(' ');
    }
    push_children(element, out);
    if block {
        out.push(' ');
    }
}

/// Collapse whitespace runs into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Format an XPath number the way browsers stringify numbers.
///
/// Magnitudes from 1e21 up and below 1e-6 use exponent notation (`1e+22`,
/// `1.5e-7`); the rest print as plain decimals.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }
    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}
