//! Record extraction from one parsed document.

use fieldscrape_record::RecordBuilder;
use fieldscrape_record::diagnostics::Diagnostics;
use fieldscrape_record::normalize::capitalize_words;
use fieldscrape_record_models::SENTINEL;
use scraper::{ElementRef, Html};

use crate::layout::{CompiledIdentity, CompiledLayout};

/// Records extracted from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeOutcome<R> {
    /// Records built, in document order.
    pub records: Vec<R>,
    /// Units whose record could not be built.
    pub rejected: usize,
}

impl<R> Default for ScrapeOutcome<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: 0,
        }
    }
}

/// Derives an identity from the final path segment of `address`.
///
/// Query and fragment are ignored, the extension is stripped and each word
/// capitalized: `https://host/weather/gold_coast.html?x=1` gives
/// `"Gold Coast"`. An address with no path yields an empty string.
#[must_use]
pub fn identity_from_address(address: &str) -> String {
    let without_query = address.split(['?', '#']).next().unwrap_or_default();
    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
        None => without_query,
    };
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let stem = segment.rsplit_once('.').map_or(segment, |(stem, _)| stem);

    capitalize_words(stem)
}

/// Builds one record per unit of `document`.
///
/// The identity and document-scoped fields are resolved once and shared
/// by every unit. Values are assembled in column order; columns with no
/// locator get the sentinel. A unit whose record cannot be built is
/// reported to `diagnostics` and skipped.
pub fn scrape_document<R: RecordBuilder>(
    document: &Html,
    address: &str,
    layout: &CompiledLayout,
    diagnostics: &dyn Diagnostics,
) -> ScrapeOutcome<R> {
    let root = document.root_element();

    let identity = match &layout.identity {
        CompiledIdentity::UrlSegment => identity_from_address(address),
        CompiledIdentity::Locator(locator) => locator.extract(root).into_value(),
    };

    let mut shared = vec![SENTINEL.to_owned(); layout.columns.len()];
    shared[0] = identity;
    for (index, locator) in &layout.document_fields {
        shared[*index] = locator.extract(root).into_value();
    }

    let units: Vec<ElementRef<'_>> = match &layout.unit_selector {
        Some(selector) => document.select(selector).collect(),
        None => vec![root],
    };

    if units.is_empty() {
        diagnostics.warn(&format!("{address}: no units matched the page layout"));
    }

    let mut outcome = ScrapeOutcome::default();

    for (position, unit) in units.into_iter().enumerate() {
        let mut values = shared.clone();
        for (index, locator) in &layout.unit_fields {
            let extracted = locator.extract(unit);
            if extracted.is_fallback() {
                log::debug!(
                    "{address}: unit {} has no {}",
                    position + 1,
                    layout.columns[*index]
                );
            }
            values[*index] = extracted.into_value();
        }

        match R::build(&values) {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                outcome.rejected += 1;
                diagnostics.warn(&format!(
                    "{address}: skipping unit {}: {e}",
                    position + 1
                ));
            }
        }
    }

    outcome
}
