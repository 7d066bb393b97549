//! Subcommand implementations shared by the flag-driven and interactive
//! front ends.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fieldscrape_cli_utils::{IndicatifProgress, MultiProgress};
use fieldscrape_record::RecordBuilder;
use fieldscrape_record::diagnostics::log_diagnostics;
use fieldscrape_record_models::{Forecast, Movie, RecordKind};
use fieldscrape_scraper::run::SiteRecords;
use fieldscrape_scraper::{
    FetchConfig, HttpFetcher, ScrapeError, ScrapeOptions, SiteDefinition, all_sites,
    enabled_sites, find_site, scrape_site,
};
use fieldscrape_sink::{CsvSink, SinkError, paths};
use fieldscrape_tabular::TabularReader;
use serde_json::to_string;

/// HTTP client and pacing flags shared by the scrape commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FetchArgs {
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// `User-Agent` header to send
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Extra request header as `NAME:VALUE` (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
    /// Pause between consecutive fetches, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

impl FetchArgs {
    /// HTTP client settings with these flags applied over the defaults.
    #[must_use]
    pub fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig::default();
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        for (name, value) in &self.headers {
            config = config.with_header(name, value);
        }
        config
    }

    /// `options` with the fetch delay applied.
    #[must_use]
    pub fn apply(&self, options: ScrapeOptions) -> ScrapeOptions {
        match self.delay_ms {
            Some(ms) => options.with_delay_ms(ms),
            None => options,
        }
    }
}

/// Parses a `NAME:VALUE` header flag.
///
/// # Errors
///
/// Returns an error if there is no `:` or the name is blank.
pub fn parse_header(header: &str) -> Result<(String, String), String> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_owned(), value.trim().to_owned()))
        }
        _ => Err(format!("expected NAME:VALUE, got {header:?}")),
    }
}

/// Prints every registered site as a table.
pub fn list_sites() {
    let sites = all_sites();
    println!("{:<20} {:<10} NAME", "ID", "KIND");
    println!("{}", "-".repeat(60));
    for site in &sites {
        println!("{:<20} {:<10} {}", site.id(), site.kind, site.name());
    }
}

/// Splits a comma-separated flag value, dropping blank items.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// # Errors
///
/// Returns an error if `delimiter` is not a single ASCII character.
pub fn delimiter_byte(delimiter: char) -> Result<u8, String> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| format!("delimiter must be a single ASCII character, got {delimiter:?}"))
}

/// Scrapes one site and appends its records to `output`.
///
/// # Errors
///
/// Returns an error if the site is unknown, its layout is invalid, the
/// HTTP client cannot be built, or the output file cannot be written.
pub async fn scrape(
    multi: &MultiProgress,
    site_id: &str,
    urls: Option<Vec<String>>,
    limit: Option<usize>,
    output: Option<PathBuf>,
    fetch: &FetchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let site = find_site(site_id).ok_or_else(|| ScrapeError::UnknownSite(site_id.to_owned()))?;

    let mut options = fetch.apply(ScrapeOptions::default());
    if let Some(urls) = urls {
        options = options.with_urls(urls);
    }
    if let Some(limit) = limit {
        options = options.with_limit(limit);
    }

    let output = output.unwrap_or_else(|| paths::output_path(&site.output_filename()));
    let fetcher = HttpFetcher::new(&fetch.fetch_config())?;

    scrape_one(multi, &fetcher, &site, &options, &output).await?;
    Ok(())
}

/// Scrapes every enabled site, each into its own file. A site that fails
/// is logged and skipped.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub async fn scrape_all(
    multi: &MultiProgress,
    filter: Option<String>,
    output_dir: Option<PathBuf>,
    fetch: &FetchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let sites = enabled_sites(filter);
    log::info!(
        "Scraping {} site(s): {}",
        sites.len(),
        sites
            .iter()
            .map(SiteDefinition::id)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let fetcher = HttpFetcher::new(&fetch.fetch_config())?;
    let output_dir = output_dir.unwrap_or_else(paths::data_dir);
    let options = fetch.apply(ScrapeOptions::default());
    let overall = IndicatifProgress::sites_bar(multi, sites.len() as u64);

    let mut failed = Vec::new();
    for site in &sites {
        overall.set_message(site.id().to_owned());
        let output = output_dir.join(site.output_filename());
        if let Err(e) = scrape_one(multi, &fetcher, site, &options, &output).await {
            log::error!("Failed to scrape {}: {e}", site.id());
            failed.push(site.id().to_owned());
        }
        overall.inc(1);
    }

    if failed.is_empty() {
        overall.finish("done".to_owned());
    } else {
        overall.finish(format!("{} failed: {}", failed.len(), failed.join(", ")));
    }

    Ok(())
}

async fn scrape_one(
    multi: &MultiProgress,
    fetcher: &HttpFetcher,
    site: &SiteDefinition,
    options: &ScrapeOptions,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let diagnostics = log_diagnostics();
    let progress = IndicatifProgress::pages_bar(multi, site.id());

    let run = scrape_site(fetcher, site, options, diagnostics.as_ref(), progress.as_ref()).await?;

    print_identities(run.records.kind(), &run.records.identities());
    for source in run.failed_sources() {
        log::warn!(
            "{} contributed no records: {}",
            source.address,
            source.error.as_deref().unwrap_or_default()
        );
    }

    let written = append(run.records, output)?;
    println!("Wrote {written} record(s) to {}", output.display());

    Ok(())
}

fn append(records: SiteRecords, output: &Path) -> Result<usize, SinkError> {
    let sink = CsvSink::new();
    match records {
        SiteRecords::Forecast(records) => sink.append_now(output, records),
        SiteRecords::Movie(records) => sink.append_now(output, records),
    }
}

/// Reads records of `kind` from `path` and prints their identities, or
/// every record as a JSON line.
///
/// # Errors
///
/// Returns an error if a record cannot be serialized.
pub fn read(
    path: &Path,
    kind: RecordKind,
    delimiter: u8,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let reader = TabularReader::new().with_delimiter(delimiter);
    match kind {
        RecordKind::Forecast => read_as::<Forecast>(&reader, path, json),
        RecordKind::Movie => read_as::<Movie>(&reader, path, json),
    }
}

fn read_as<R>(
    reader: &TabularReader,
    path: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: RecordBuilder + serde::Serialize,
{
    let diagnostics = log_diagnostics();
    let outcome = reader.read_path::<R>(path, diagnostics.as_ref());

    if json {
        for record in &outcome.records {
            println!("{}", to_string(record)?);
        }
    } else {
        let identities = outcome
            .records
            .identities()
            .into_iter()
            .map(str::to_owned)
            .collect();
        print_identities(R::KIND, &identities);
    }

    log::info!(
        "Read {} record(s) from {}, skipped {} line(s)",
        outcome.records.len(),
        path.display(),
        outcome.rejected.len()
    );

    Ok(())
}

fn print_identities(kind: RecordKind, identities: &BTreeSet<String>) {
    let heading = match kind {
        RecordKind::Forecast => "Locations",
        RecordKind::Movie => "Titles",
    };
    println!("{heading} ({}):", identities.len());
    for identity in identities {
        println!("  {identity}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_comma_lists() {
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn parses_header_flags() {
        assert_eq!(
            parse_header("Accept-Language: en-AU"),
            Ok(("Accept-Language".to_owned(), "en-AU".to_owned()))
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(" :value").is_err());
    }

    #[test]
    fn fetch_flags_reach_client_config_and_options() {
        let args = FetchArgs {
            timeout: Some(5),
            user_agent: Some("fieldscrape-test".to_owned()),
            headers: vec![("Accept-Language".to_owned(), "en".to_owned())],
            delay_ms: Some(250),
        };

        let config = args.fetch_config();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "fieldscrape-test");
        assert_eq!(config.headers.get("Accept-Language").map(String::as_str), Some("en"));
        assert_eq!(args.apply(ScrapeOptions::default()).delay_ms, Some(250));

        let defaults = FetchArgs::default();
        assert_eq!(defaults.fetch_config().timeout, fieldscrape_scraper::fetch::DEFAULT_TIMEOUT);
        assert_eq!(defaults.apply(ScrapeOptions::default()).delay_ms, None);
    }

    #[test]
    fn delimiter_must_be_ascii() {
        assert_eq!(delimiter_byte('\t'), Ok(b'\t'));
        assert_eq!(delimiter_byte(';'), Ok(b';'));
        assert!(delimiter_byte('é').is_err());
        assert!(delimiter_byte('€').is_err());
    }
}
