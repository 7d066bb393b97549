//! Page layouts: where a record's fields live in a document.
//!
//! A layout names an optional repeating unit (`div.day`), how the identity
//! is derived, and two locator tables keyed by column name. Document
//! fields are located once per page and shared by every unit; unit fields
//! are located inside each unit. Columns absent from both tables resolve
//! to the sentinel.

use std::collections::BTreeMap;

use fieldscrape_extract::{CompiledLocator, FieldLocator};
use fieldscrape_record_models::Record;
use scraper::Selector;
use serde::Deserialize;

use crate::LayoutError;

/// How a page's identity (location or title) is derived.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentityRule {
    /// Final path segment of the page address, extension stripped.
    #[default]
    UrlSegment,
    /// A document-scoped locator, e.g. the `<title>` text.
    Locator(FieldLocator),
}

/// A page layout as written in a site definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLayout {
    /// Selector for the repeating unit. Absent: the whole document is one unit.
    #[serde(default)]
    pub unit_selector: Option<String>,
    /// Identity rule.
    #[serde(default)]
    pub identity: IdentityRule,
    /// Fields located once per document.
    #[serde(default)]
    pub document_fields: BTreeMap<String, FieldLocator>,
    /// Fields located inside each unit.
    #[serde(default)]
    pub unit_fields: BTreeMap<String, FieldLocator>,
}

impl PageLayout {
    /// Validates the layout against the columns of `R` and compiles every
    /// selector and pattern.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if a field name is not a column of `R`, is
    /// the identity column, appears in both tables, or if any selector or
    /// pattern fails to compile.
    pub fn compile<R: Record>(&self) -> Result<CompiledLayout, LayoutError> {
        for name in self.unit_fields.keys() {
            if self.document_fields.contains_key(name) {
                return Err(LayoutError::DuplicateField(name.clone()));
            }
        }

        let unit_selector = self
            .unit_selector
            .as_deref()
            .map(|selector| {
                Selector::parse(selector).map_err(|e| LayoutError::UnitSelector {
                    selector: selector.to_owned(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        let identity = match &self.identity {
            IdentityRule::UrlSegment => CompiledIdentity::UrlSegment,
            IdentityRule::Locator(locator) => CompiledIdentity::Locator(
                locator.compile().map_err(|source| LayoutError::Locator {
                    field: R::COLUMNS[0].to_owned(),
                    source,
                })?,
            ),
        };

        Ok(CompiledLayout {
            columns: R::COLUMNS,
            unit_selector,
            identity,
            document_fields: compile_fields::<R>(&self.document_fields)?,
            unit_fields: compile_fields::<R>(&self.unit_fields)?,
        })
    }
}

fn compile_fields<R: Record>(
    fields: &BTreeMap<String, FieldLocator>,
) -> Result<Vec<(usize, CompiledLocator)>, LayoutError> {
    fields
        .iter()
        .map(|(name, locator)| {
            let index = column_index::<R>(name)?;
            let compiled = locator.compile().map_err(|source| LayoutError::Locator {
                field: name.clone(),
                source,
            })?;
            Ok((index, compiled))
        })
        .collect()
}

fn column_index<R: Record>(name: &str) -> Result<usize, LayoutError> {
    match R::COLUMNS.iter().position(|column| *column == name) {
        Some(0) => Err(LayoutError::IdentityField(name.to_owned())),
        Some(index) => Ok(index),
        None => Err(LayoutError::UnknownField {
            kind: R::KIND,
            field: name.to_owned(),
        }),
    }
}

#[derive(Debug, Clone)]
pub(crate) enum CompiledIdentity {
    UrlSegment,
    Locator(CompiledLocator),
}

/// A validated layout bound to one record kind's columns.
#[derive(Debug, Clone)]
pub struct CompiledLayout {
    pub(crate) columns: &'static [&'static str],
    pub(crate) unit_selector: Option<Selector>,
    pub(crate) identity: CompiledIdentity,
    pub(crate) document_fields: Vec<(usize, CompiledLocator)>,
    pub(crate) unit_fields: Vec<(usize, CompiledLocator)>,
}

impl CompiledLayout {
    /// Column names of the target record.
    #[must_use]
    pub const fn columns(&self) -> &'static [&'static str] {
        self.columns
    }
}

/// Where the movie tiles are on a listing page.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingLayout {
    /// Selector for one tile.
    pub tile_selector: String,
    /// Locator for the tile's detail link, relative to the tile.
    pub link: FieldLocator,
    /// Locator for a human-readable tile label, relative to the tile.
    #[serde(default)]
    pub label: Option<FieldLocator>,
    /// Base for relative links. Defaults to the listing page address.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ListingLayout {
    /// Compiles the tile selector and locators.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if any selector or pattern fails to compile.
    pub fn compile(&self) -> Result<CompiledListing, LayoutError> {
        let tile = Selector::parse(&self.tile_selector).map_err(|e| LayoutError::UnitSelector {
            selector: self.tile_selector.clone(),
            message: e.to_string(),
        })?;
        let link = self.link.compile().map_err(|source| LayoutError::Locator {
            field: "link".to_owned(),
            source,
        })?;
        let label = self
            .label
            .as_ref()
            .map(FieldLocator::compile)
            .transpose()
            .map_err(|source| LayoutError::Locator {
                field: "label".to_owned(),
                source,
            })?;

        Ok(CompiledListing {
            tile,
            link,
            label,
            base_url: self.base_url.clone(),
        })
    }
}

/// A validated [`ListingLayout`].
#[derive(Debug, Clone)]
pub struct CompiledListing {
    pub(crate) tile: Selector,
    pub(crate) link: CompiledLocator,
    pub(crate) label: Option<CompiledLocator>,
    pub(crate) base_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use fieldscrape_record_models::{Forecast, Movie, RecordKind};

    use super::*;

    fn layout(toml: &str) -> PageLayout {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn compiles_forecast_layout() {
        let compiled = layout(
            r#"
            unit_selector = "div.day"

            [document_fields.updated_date]
            selector = "p.date"

            [unit_fields.min_temp]
            selector = "li"
            label = { prefix = "Min:" }
            separator = ":"
            unit = "°C"
            "#,
        )
        .compile::<Forecast>()
        .unwrap();

        assert!(compiled.unit_selector.is_some());
        assert_eq!(compiled.columns().len(), 10);
        assert_eq!(compiled.document_fields.len(), 1);
        assert_eq!(compiled.unit_fields[0].0, 3);
    }

    #[test]
    fn rejects_fields_that_are_not_columns() {
        let err = layout(
            r#"
            [unit_fields.humidity]
            selector = "li"
            "#,
        )
        .compile::<Forecast>()
        .unwrap_err();

        assert!(matches!(
            err,
            LayoutError::UnknownField { kind: RecordKind::Forecast, ref field } if field == "humidity"
        ));
    }

    #[test]
    fn rejects_identity_and_duplicate_fields() {
        let identity = layout(
            r#"
            [document_fields.title]
            selector = "title"
            "#,
        )
        .compile::<Movie>();
        assert!(matches!(identity, Err(LayoutError::IdentityField(_))));

        let duplicate = layout(
            r#"
            [document_fields.genre]
            selector = "dd"
            [unit_fields.genre]
            selector = "dd"
            "#,
        )
        .compile::<Movie>();
        assert!(matches!(duplicate, Err(LayoutError::DuplicateField(f)) if f == "genre"));
    }

    #[test]
    fn reports_the_field_whose_locator_is_invalid() {
        let err = layout(
            r#"
            [unit_fields.condition]
            selector = "li"
            label = { pattern = "(" }
            "#,
        )
        .compile::<Forecast>()
        .unwrap_err();

        assert!(matches!(err, LayoutError::Locator { ref field, .. } if field == "condition"));
    }

    #[test]
    fn identity_rule_defaults_to_url_segment() {
        let plain = layout("");
        assert_eq!(plain.identity, IdentityRule::UrlSegment);
        assert!(plain.compile::<Forecast>().unwrap().unit_selector.is_none());

        let titled = layout(
            r#"
            identity = { locator = { selector = "title", pattern = '^([^|]+)' } }
            "#,
        );
        assert!(matches!(titled.identity, IdentityRule::Locator(_)));
    }
}
