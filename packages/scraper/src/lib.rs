#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page scraping for forecast and movie sites.
//!
//! A site is described entirely by data: a [`SiteDefinition`] TOML file
//! naming its URLs and a [`PageLayout`] of field locators. The scraper
//! fetches each page through a [`Fetcher`], walks the layout's repeating
//! units in document order, and hands every unit's field texts to the
//! shared [`RecordBuilder`](fieldscrape_record::RecordBuilder).
//!
//! Sources are processed one at a time. A source that cannot be fetched
//! is reported and contributes zero records; the run carries on with the
//! next one.

pub mod fetch;
pub mod layout;
pub mod listing;
pub mod page;
pub mod progress;
pub mod registry;
pub mod run;
pub mod site;

pub use fetch::{FetchConfig, Fetcher, HttpFetcher};
pub use layout::{CompiledLayout, IdentityRule, PageLayout};
pub use registry::{all_sites, enabled_sites, find_site};
pub use run::{ScrapeOptions, SiteRecords, SiteRun, SourceSummary, scrape_pages, scrape_site};
pub use site::SiteDefinition;

use fieldscrape_extract::LocatorError;
use fieldscrape_record_models::RecordKind;

/// Errors raised while fetching a single document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request failed or returned a non-success status.
    #[error("request to {url} failed: {source}")]
    Request {
        /// The requested address.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// A configured header name or value is not valid HTTP.
    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    /// A relative link could not be resolved to an absolute address.
    #[error("cannot resolve link '{href}' against '{base}'")]
    InvalidLink {
        /// Base address.
        base: String,
        /// The link as found in the page.
        href: String,
    },

    /// No document is available at this address.
    #[error("no document at {0}")]
    NotFound(String),
}

/// Errors raised while loading or validating a page layout.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A field name is not a column of the target record.
    #[error("'{field}' is not a {kind} column")]
    UnknownField {
        /// Record kind the layout targets.
        kind: RecordKind,
        /// The offending field name.
        field: String,
    },

    /// A field is located both per document and per unit.
    #[error("'{0}' is located both per document and per unit")]
    DuplicateField(String),

    /// The identity column is given a field locator instead of an identity rule.
    #[error("'{0}' is the identity column; use the identity rule instead")]
    IdentityField(String),

    /// The unit selector did not parse.
    #[error("invalid unit selector '{selector}': {message}")]
    UnitSelector {
        /// The selector text.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// A field locator did not compile.
    #[error("field '{field}': {source}")]
    Locator {
        /// Field name.
        field: String,
        /// Underlying locator error.
        #[source]
        source: LocatorError,
    },
}

/// Errors that stop a whole site from being scraped.
///
/// Per-source fetch failures are not in here: they are reported and the
/// source yields zero records.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The page or listing layout is invalid.
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// A site definition did not parse.
    #[error("Definition error: {0}")]
    Definition(#[from] toml::de::Error),

    /// A movie site has no listing layout.
    #[error("site '{0}' has no listing layout")]
    MissingListing(String),

    /// No site with this id is registered.
    #[error("unknown site '{0}'")]
    UnknownSite(String),
}
