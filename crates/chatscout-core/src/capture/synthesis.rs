//! Selector synthesis from captured element metadata.

use crate::model::{ConfidenceTier, DetectionMethod, MAX_ALTERNATIVES, SelectorInfo};
use crate::page::PageDriver;
use crate::validator::validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::debug;

/// Attributes read from a clicked element. Anything else is dropped.
pub const CAPTURED_ATTRIBUTES: &[&str] = &[
    "type",
    "name",
    "placeholder",
    "aria-label",
    "data-testid",
    "role",
    "contenteditable",
    "data-role",
];

/// Class the hover highlight puts on the element under the pointer.
pub const HIGHLIGHT_CLASS: &str = "chatscout-highlight";

/// Class prefixes emitted by frameworks and CSS-in-JS tooling; never stable.
const NOISE_CLASS_PREFIXES: &[&str] = &["ng-", "_", "css-"];

/// Attributes that become standalone attribute-selector alternatives.
const ALTERNATIVE_ATTRIBUTES: &[&str] = &["aria-label", "data-testid", "role"];

const TEXT_PREVIEW_CHARS: usize = 100;
const PLACEHOLDER_CHARS: usize = 30;
const MAX_CLASS_TOKENS: usize = 2;

/// Metadata of the element the user clicked, plus its synthesized selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedElement {
    pub tag_name: String,
    pub class_attribute: String,
    pub id_attribute: String,
    pub text_preview: String,
    pub attributes: BTreeMap<String, String>,
    pub selector: String,
}

impl CapturedElement {
    /// Build from raw metadata, normalising it and synthesizing the selector.
    /// The hover highlight class is stripped from the class list.
    pub fn new(
        tag_name: &str,
        class_attribute: &str,
        id_attribute: &str,
        text: &str,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        let mut element = Self {
            tag_name: tag_name.to_lowercase(),
            class_attribute: class_attribute
                .split_whitespace()
                .filter(|t| *t != HIGHLIGHT_CLASS)
                .collect::<Vec<_>>()
                .join(" "),
            id_attribute: id_attribute.to_string(),
            text_preview: text.chars().take(TEXT_PREVIEW_CHARS).collect::<String>().trim().to_string(),
            attributes: attributes
                .into_iter()
                .filter(|(name, value)| {
                    CAPTURED_ATTRIBUTES.contains(&name.as_str()) && !value.is_empty()
                })
                .collect(),
            selector: String::new(),
        };
        element.selector = synthesize_selector(&element);
        element
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Escape an identifier the way the CSSOM `CSS.escape()` does.
pub fn css_escape(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\0' => out.push('\u{FFFD}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => push_code_point(&mut out, c),
            '0'..='9' if i == 0 || (i == 1 && chars[0] == '-') => push_code_point(&mut out, c),
            '-' if i == 0 && chars.len() == 1 => out.push_str("\\-"),
            c if c as u32 >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() => {
                out.push(c)
            }
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

fn push_code_point(out: &mut String, c: char) {
    let _ = write!(out, "\\{:x} ", c as u32);
}

/// Double-quoted attribute value with quotes and backslashes escaped.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn is_stable_class(token: &str) -> bool {
    token.chars().count() > 2 && !NOISE_CLASS_PREFIXES.iter().any(|p| token.starts_with(p))
}

fn class_selector(class_attribute: &str) -> Option<String> {
    let tokens: Vec<String> = class_attribute
        .split_whitespace()
        .filter(|t| is_stable_class(t))
        .take(MAX_CLASS_TOKENS)
        .map(|t| format!(".{}", css_escape(t)))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.concat())
    }
}

/// Derive the primary selector. First applicable rule wins:
/// id, `data-testid`, `aria-label`, stable classes, then tag with
/// `type`/`placeholder` qualifiers.
pub fn synthesize_selector(element: &CapturedElement) -> String {
    let tag = &element.tag_name;

    if !element.id_attribute.is_empty() {
        return format!("#{}", css_escape(&element.id_attribute));
    }
    if let Some(test_id) = element.attribute("data-testid") {
        return format!("[data-testid={}]", quote(test_id));
    }
    if let Some(label) = element.attribute("aria-label") {
        return format!("{}[aria-label={}]", tag, quote(label));
    }
    if let Some(classes) = class_selector(&element.class_attribute) {
        return classes;
    }

    let mut selector = tag.clone();
    if let Some(kind) = element.attribute("type") {
        selector.push_str(&format!("[type={}]", quote(kind)));
    }
    if let Some(placeholder) = element.attribute("placeholder") {
        let head: String = placeholder.chars().take(PLACEHOLDER_CHARS).collect();
        selector.push_str(&format!("[placeholder*={}]", quote(&head)));
    }
    selector
}

/// Ranked fallbacks for a captured element, at most [`MAX_ALTERNATIVES`].
pub fn generate_alternatives(element: &CapturedElement) -> Vec<String> {
    let mut alternatives = Vec::new();

    if let Some(first) = element.class_attribute.split_whitespace().next() {
        alternatives.push(format!("{}.{}", element.tag_name, css_escape(first)));
    }
    for name in ALTERNATIVE_ATTRIBUTES {
        if let Some(value) = element.attribute(name) {
            alternatives.push(format!("[{}={}]", name, quote(value)));
        }
    }
    alternatives.push(element.tag_name.clone());

    alternatives.truncate(MAX_ALTERNATIVES);
    alternatives
}

/// Turn a capture into a [`SelectorInfo`], downgrading confidence rather than
/// failing when the synthesized selector does not resolve.
pub async fn build_info(
    page: &dyn PageDriver,
    captured: Option<&CapturedElement>,
) -> Option<SelectorInfo> {
    let captured = captured?;
    if captured.selector.is_empty() {
        return None;
    }
    let tag = &captured.tag_name;
    let alternatives = generate_alternatives(captured);

    if validate(page, &captured.selector, 0, false).await {
        return Some(
            SelectorInfo::new(
                captured.selector.as_str(),
                ConfidenceTier::High,
                DetectionMethod::Click,
                format!("Da click su {}", tag),
            )
            .with_alternatives(alternatives),
        );
    }

    debug!("captured selector {} did not validate", captured.selector);
    for alternative in alternatives {
        if validate(page, &alternative, 0, false).await {
            return Some(
                SelectorInfo::new(
                    alternative,
                    ConfidenceTier::Medium,
                    DetectionMethod::ClickAlternative,
                    format!("Alternativa per {}", tag),
                )
                .with_alternatives(vec![captured.selector.clone()]),
            );
        }
    }

    Some(SelectorInfo::new(
        captured.selector.as_str(),
        ConfidenceTier::Low,
        DetectionMethod::ClickUnvalidated,
        format!("Da click su {} (non validato)", tag),
    ))
}
