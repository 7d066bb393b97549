//! Declarative field locators for HTML documents.
//!
//! Locators are deserialized from the site definition TOML files, e.g.
//!
//! ```toml
//! [page.unit_fields.min_temp]
//! selector = "li"
//! label = { prefix = "Min:" }
//! separator = ":"
//! unit = "°C"
//! ```

use fieldscrape_record::normalize::{collapse_whitespace, strip_unit};
use fieldscrape_record_models::SENTINEL;
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Selector};
use serde::Deserialize;

use crate::{Extracted, LocatorError};

/// How a candidate element's text must look to be picked.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LabelMatch {
    /// Text starts with this prefix (case-sensitive).
    Prefix(String),
    /// Text contains any of these phrases (case-insensitive).
    Keywords(Vec<String>),
    /// Text matches this regular expression.
    Pattern(String),
}

/// Where the value lives relative to the matched element.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// The element's own text.
    #[default]
    Text,
    /// The text of the next sibling element.
    NextSibling,
    /// An attribute of the element.
    Attribute(String),
}

/// A field locator as written in a site definition.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FieldLocator {
    /// CSS selector for candidate elements within the unit.
    pub selector: String,
    /// Optional filter on a candidate's text; the first passing candidate wins.
    #[serde(default)]
    pub label: Option<LabelMatch>,
    /// Where to read the raw value from.
    #[serde(default)]
    pub source: ValueSource,
    /// Keep only what follows the first occurrence of this separator.
    #[serde(default)]
    pub separator: Option<String>,
    /// Keep only the first capture group (or whole match) of this regex.
    ///
    /// Takes precedence over `separator`.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Unit suffix to strip from the value.
    #[serde(default)]
    pub unit: Option<String>,
    /// Value used when nothing is found. Defaults to the sentinel.
    #[serde(default)]
    pub fallback: Option<String>,
}

impl FieldLocator {
    /// Locator reading the full text of the first element matching `selector`.
    #[must_use]
    pub fn text(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            label: None,
            source: ValueSource::Text,
            separator: None,
            pattern: None,
            unit: None,
            fallback: None,
        }
    }

    /// Keeps only elements whose text passes `label`.
    #[must_use]
    pub fn with_label(mut self, label: LabelMatch) -> Self {
        self.label = Some(label);
        self
    }

    /// Reads the value from `source` instead of the element text.
    #[must_use]
    pub fn with_source(mut self, source: ValueSource) -> Self {
        self.source = source;
        self
    }

    /// Takes the text after the first occurrence of `separator`.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Takes the first capture group of `pattern` (or the whole match).
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Strips the trailing `unit` from the value.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Validates the selector and patterns.
    ///
    /// # Errors
    ///
    /// * [`LocatorError::Selector`] if the CSS selector does not parse
    /// * [`LocatorError::Pattern`] if a label or value pattern does not compile
    pub fn compile(&self) -> Result<CompiledLocator, LocatorError> {
        let selector =
            Selector::parse(&self.selector).map_err(|e| LocatorError::Selector {
                selector: self.selector.clone(),
                message: e.to_string(),
            })?;

        let label = match &self.label {
            None => None,
            Some(LabelMatch::Prefix(prefix)) => Some(CompiledLabel::Prefix(prefix.clone())),
            Some(LabelMatch::Keywords(words)) => {
                let alternation = words
                    .iter()
                    .map(|w| regex::escape(w.trim()))
                    .collect::<Vec<_>>()
                    .join("|");
                let regex = RegexBuilder::new(&format!("(?:{alternation})"))
                    .case_insensitive(true)
                    .build()?;
                Some(CompiledLabel::Regex(regex))
            }
            Some(LabelMatch::Pattern(pattern)) => Some(CompiledLabel::Regex(Regex::new(pattern)?)),
        };

        let pattern = self.pattern.as_deref().map(Regex::new).transpose()?;

        Ok(CompiledLocator {
            selector,
            label,
            source: self.source.clone(),
            separator: self.separator.clone().filter(|s| !s.is_empty()),
            pattern,
            unit: self.unit.clone(),
            fallback: self
                .fallback
                .clone()
                .unwrap_or_else(|| SENTINEL.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
enum CompiledLabel {
    Prefix(String),
    Regex(Regex),
}

impl CompiledLabel {
    fn matches(&self, text: &str) -> bool {
        match self {
            Self::Prefix(prefix) => text.starts_with(prefix.as_str()),
            Self::Regex(regex) => regex.is_match(text),
        }
    }
}

/// A validated locator, ready to run against document units.
#[derive(Debug, Clone)]
pub struct CompiledLocator {
    selector: Selector,
    label: Option<CompiledLabel>,
    source: ValueSource,
    separator: Option<String>,
    pattern: Option<Regex>,
    unit: Option<String>,
    fallback: String,
}

impl CompiledLocator {
    /// The first element under `scope` (in document order) that matches
    /// the selector and passes the label filter.
    #[must_use]
    pub fn locate<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope.select(&self.selector).find(|element| {
            self.label
                .as_ref()
                .is_none_or(|label| label.matches(&element_text(*element)))
        })
    }

    /// Extracts this field from `scope`.
    ///
    /// Falls back when no element is located, when the value source is
    /// absent, when `pattern` does not match, or when the cleaned value is
    /// blank.
    #[must_use]
    pub fn extract(&self, scope: ElementRef<'_>) -> Extracted {
        self.locate(scope)
            .and_then(|element| self.raw_value(element))
            .and_then(|raw| self.clean(&raw))
            .map_or_else(|| Extracted::Fallback(self.fallback.clone()), Extracted::Found)
    }

    fn raw_value(&self, element: ElementRef<'_>) -> Option<String> {
        match &self.source {
            ValueSource::Text => Some(element_text(element)),
            ValueSource::NextSibling => element
                .next_siblings()
                .find_map(ElementRef::wrap)
                .map(element_text),
            ValueSource::Attribute(name) => element
                .value()
                .attr(name)
                .map(collapse_whitespace),
        }
    }

    fn clean(&self, raw: &str) -> Option<String> {
        let value = if let Some(pattern) = &self.pattern {
            let captures = pattern.captures(raw)?;
            captures
                .get(1)
                .or_else(|| captures.get(0))
                .map_or("", |m| m.as_str())
                .trim()
        } else if let Some(separator) = &self.separator {
            raw.split_once(separator.as_str())
                .map_or(raw, |(_, rest)| rest)
                .trim()
        } else {
            raw.trim()
        };

        let value = match &self.unit {
            Some(unit) => strip_unit(value, unit),
            None => value,
        };

        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Whitespace-collapsed text content of an element.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(""))
}
