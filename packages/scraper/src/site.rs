//! Site definitions loaded from TOML.

use fieldscrape_record_models::RecordKind;
use serde::Deserialize;

use crate::ScrapeError;
use crate::layout::{ListingLayout, PageLayout};

/// Everything needed to scrape one site.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteDefinition {
    /// Unique identifier (e.g. `"scu_weather"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Kind of record the site yields.
    pub kind: RecordKind,
    /// Default addresses. For movie sites these are listing pages.
    pub urls: Vec<String>,
    /// Layout of the pages that yield records.
    pub page: PageLayout,
    /// Layout of the listing pages (movie sites only).
    #[serde(default)]
    pub listing: Option<ListingLayout>,
    /// File name the CLI appends to, under the data directory.
    #[serde(default)]
    pub output_filename: Option<String>,
}

impl SiteDefinition {
    /// Unique identifier used on the command line and in `FIELDSCRAPE_SITES`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable site name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The output file name, defaulting to `<id>.csv`.
    #[must_use]
    pub fn output_filename(&self) -> String {
        self.output_filename
            .clone()
            .unwrap_or_else(|| format!("{}.csv", self.id))
    }
}

/// Parses a site definition from TOML text.
///
/// # Errors
///
/// Returns [`ScrapeError::Definition`] if the text is not a valid site
/// definition.
pub fn parse_site_toml(toml_str: &str) -> Result<SiteDefinition, ScrapeError> {
    Ok(toml::from_str(toml_str)?)
}
