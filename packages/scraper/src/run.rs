//! Sequential scrape runs over many sources.
//!
//! Every source is fetched, parsed and extracted before the next one is
//! requested. A source that fails to fetch is reported, summarized with
//! its error, and contributes nothing; the others are unaffected.

use std::collections::BTreeSet;
use std::time::Duration;

use fieldscrape_record::RecordBuilder;
use fieldscrape_record::diagnostics::Diagnostics;
use fieldscrape_record_models::{Collection, Forecast, Movie, RecordKind};
use scraper::Html;

use crate::ScrapeError;
use crate::fetch::Fetcher;
use crate::layout::{CompiledLayout, CompiledListing};
use crate::listing::{Tile, tiles};
use crate::page::{ScrapeOutcome, scrape_document};
use crate::progress::ProgressCallback;
use crate::site::SiteDefinition;

/// Per-run overrides of a site's defaults.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Addresses to use instead of the site's own.
    pub urls: Option<Vec<String>>,
    /// Cap on pages (forecast sites) or detail pages (movie sites).
    pub limit: Option<usize>,
    /// Pause between consecutive fetches.
    pub delay_ms: Option<u64>,
}

impl ScrapeOptions {
    /// Scrapes `urls` instead of the site's registered addresses.
    #[must_use]
    pub fn with_urls(mut self, urls: Vec<String>) -> Self {
        self.urls = Some(urls);
        self
    }

    /// Caps the number of pages (forecast sites) or detail pages (movie
    /// sites) fetched.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Waits `ms` milliseconds between consecutive fetches.
    #[must_use]
    pub const fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = Some(ms);
        self
    }
}

/// What one source address contributed to a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    /// The address fetched.
    pub address: String,
    /// Records built from it.
    pub records: usize,
    /// Units whose record was rejected.
    pub rejected: usize,
    /// Why the source yielded nothing, if it failed.
    pub error: Option<String>,
}

impl SourceSummary {
    fn failed(address: &str, error: String) -> Self {
        Self {
            address: address.to_owned(),
            records: 0,
            rejected: 0,
            error: Some(error),
        }
    }

    /// Whether the source could not be fetched.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Records from one site, typed by the site's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteRecords {
    /// Records from a forecast site.
    Forecast(Collection<Forecast>),
    /// Records from a movie site.
    Movie(Collection<Movie>),
}

impl SiteRecords {
    /// The record kind held.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Forecast(_) => RecordKind::Forecast,
            Self::Movie(_) => RecordKind::Movie,
        }
    }

    /// Number of records held.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Forecast(records) => records.len(),
            Self::Movie(records) => records.len(),
        }
    }

    /// Whether no records were built.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct identities (locations or titles).
    #[must_use]
    pub fn identities(&self) -> BTreeSet<String> {
        let owned = |ids: BTreeSet<&str>| -> BTreeSet<String> {
            ids.into_iter().map(str::to_owned).collect()
        };
        match self {
            Self::Forecast(records) => owned(records.identities()),
            Self::Movie(records) => owned(records.identities()),
        }
    }
}

/// The result of scraping one site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRun {
    /// Id of the site scraped.
    pub site_id: String,
    /// Every record built, in source then document order.
    pub records: SiteRecords,
    /// One entry per record-yielding address, plus failed listing pages.
    pub sources: Vec<SourceSummary>,
}

impl SiteRun {
    /// Summaries of sources that could not be fetched.
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceSummary> {
        self.sources.iter().filter(|s| s.is_failure())
    }
}

/// Scrapes every address in `urls` with `layout`, one after another.
///
/// Fetch failures are reported and summarized; they never abort the run.
pub async fn scrape_pages<R: RecordBuilder, F: Fetcher>(
    fetcher: &F,
    urls: &[String],
    layout: &CompiledLayout,
    options: &ScrapeOptions,
    diagnostics: &dyn Diagnostics,
    progress: &dyn ProgressCallback,
) -> (Collection<R>, Vec<SourceSummary>) {
    let mut collection = Collection::new();
    let mut summaries = Vec::with_capacity(urls.len());

    progress.set_total(urls.len() as u64);

    for (i, url) in urls.iter().enumerate() {
        if i > 0 {
            pause(options).await;
        }
        progress.set_message(url.clone());

        let (records, summary) = scrape_source::<R, F>(fetcher, url, layout, diagnostics).await;
        collection.extend(records);
        summaries.push(summary);

        progress.inc(1);
    }

    progress.finish(format!("{} records", collection.len()));
    (collection, summaries)
}

/// Scrapes one site with its registered layout.
///
/// Forecast sites scrape each address directly. Movie sites fetch each
/// listing address, enumerate its tiles, then scrape every detail page.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the site's layouts are invalid or a movie
/// site has no listing layout. Unreachable sources are not errors.
pub async fn scrape_site<F: Fetcher>(
    fetcher: &F,
    site: &SiteDefinition,
    options: &ScrapeOptions,
    diagnostics: &dyn Diagnostics,
    progress: &dyn ProgressCallback,
) -> Result<SiteRun, ScrapeError> {
    let urls = options.urls.clone().unwrap_or_else(|| site.urls.clone());

    log::info!("Scraping {} ({} address(es))", site.id(), urls.len());

    let (records, sources) = match site.kind {
        RecordKind::Forecast => {
            let layout = site.page.compile::<Forecast>()?;
            let urls: Vec<String> = match options.limit {
                Some(limit) => urls.into_iter().take(limit).collect(),
                None => urls,
            };
            let (records, sources) =
                scrape_pages::<Forecast, F>(fetcher, &urls, &layout, options, diagnostics, progress)
                    .await;
            (SiteRecords::Forecast(records), sources)
        }
        RecordKind::Movie => {
            let listing = site
                .listing
                .as_ref()
                .ok_or_else(|| ScrapeError::MissingListing(site.id.clone()))?
                .compile()?;
            let layout = site.page.compile::<Movie>()?;
            let (records, sources) = scrape_movies(
                fetcher,
                &urls,
                &listing,
                &layout,
                options,
                diagnostics,
                progress,
            )
            .await;
            (SiteRecords::Movie(records), sources)
        }
    };

    let failed = sources.iter().filter(|s| s.is_failure()).count();
    log::info!(
        "{}: {} record(s) from {} source(s), {failed} unreachable",
        site.id(),
        records.len(),
        sources.len()
    );

    Ok(SiteRun {
        site_id: site.id.clone(),
        records,
        sources,
    })
}

async fn scrape_movies<F: Fetcher>(
    fetcher: &F,
    listing_urls: &[String],
    listing: &CompiledListing,
    layout: &CompiledLayout,
    options: &ScrapeOptions,
    diagnostics: &dyn Diagnostics,
    progress: &dyn ProgressCallback,
) -> (Collection<Movie>, Vec<SourceSummary>) {
    let mut summaries = Vec::new();
    let mut found: Vec<Tile> = Vec::new();

    for listing_url in listing_urls {
        let remaining = options.limit.map(|limit| limit.saturating_sub(found.len()));
        if remaining == Some(0) {
            break;
        }

        match fetcher.fetch(listing_url).await {
            Ok(body) => {
                let document = Html::parse_document(&body);
                found.extend(tiles(&document, listing_url, listing, remaining, diagnostics));
            }
            Err(e) => {
                diagnostics.error(&format!("Failed to fetch listing {listing_url}: {e}"));
                summaries.push(SourceSummary::failed(listing_url, e.to_string()));
            }
        }
    }

    let mut collection = Collection::new();
    progress.set_total(found.len() as u64);

    for (i, tile) in found.iter().enumerate() {
        if i > 0 {
            pause(options).await;
        }
        progress.set_message(tile.label.clone());

        let (records, summary) =
            scrape_source::<Movie, F>(fetcher, &tile.url, layout, diagnostics).await;
        if !summary.is_failure() {
            diagnostics.info(&format!("{} retrieved successfully", tile.label));
        }
        collection.extend(records);
        summaries.push(summary);

        progress.inc(1);
    }

    progress.finish(format!("{} movies", collection.len()));
    (collection, summaries)
}

async fn scrape_source<R: RecordBuilder, F: Fetcher>(
    fetcher: &F,
    address: &str,
    layout: &CompiledLayout,
    diagnostics: &dyn Diagnostics,
) -> (Vec<R>, SourceSummary) {
    let body = match fetcher.fetch(address).await {
        Ok(body) => body,
        Err(e) => {
            diagnostics.error(&format!("Failed to fetch {address}: {e}"));
            return (Vec::new(), SourceSummary::failed(address, e.to_string()));
        }
    };

    let outcome = extract_body::<R>(&body, address, layout, diagnostics);
    log::debug!(
        "{address}: {} record(s), {} rejected",
        outcome.records.len(),
        outcome.rejected
    );

    let summary = SourceSummary {
        address: address.to_owned(),
        records: outcome.records.len(),
        rejected: outcome.rejected,
        error: None,
    };
    (outcome.records, summary)
}

fn extract_body<R: RecordBuilder>(
    body: &str,
    address: &str,
    layout: &CompiledLayout,
    diagnostics: &dyn Diagnostics,
) -> ScrapeOutcome<R> {
    let document = Html::parse_document(body);
    scrape_document(&document, address, layout, diagnostics)
}

async fn pause(options: &ScrapeOptions) {
    if let Some(ms) = options.delay_ms {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
