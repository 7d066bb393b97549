//! Site registry: every site definition baked into the binary.
//!
//! Each `.toml` file in `packages/scraper/sites/` is embedded at compile
//! time via [`include_str!`]. Adding a site means adding a TOML file and
//! one line below.

use crate::site::{SiteDefinition, parse_site_toml};

/// Environment variable holding a comma-separated site id filter.
pub const SITES_ENV_VAR: &str = "FIELDSCRAPE_SITES";

const SITE_TOMLS: &[(&str, &str)] = &[
    ("scu_weather", include_str!("../sites/scu_weather.toml")),
    ("rotten_tomatoes", include_str!("../sites/rotten_tomatoes.toml")),
];

/// Returns every registered site definition.
///
/// # Panics
///
/// Panics if an embedded TOML file is malformed. The files ship with the
/// binary, so this is covered by the registry tests.
#[must_use]
pub fn all_sites() -> Vec<SiteDefinition> {
    SITE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_site_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a registered site by id.
#[must_use]
pub fn find_site(id: &str) -> Option<SiteDefinition> {
    all_sites().into_iter().find(|site| site.id() == id)
}

/// Returns the sites selected by `cli_filter`, falling back to the
/// `FIELDSCRAPE_SITES` environment variable, falling back to every site.
#[must_use]
pub fn enabled_sites(cli_filter: Option<String>) -> Vec<SiteDefinition> {
    let filter = cli_filter.or_else(|| std::env::var(SITES_ENV_VAR).ok());

    let Some(filter_str) = filter else {
        return all_sites();
    };

    filter_sites(all_sites(), &filter_str)
}

fn filter_sites(all: Vec<SiteDefinition>, filter: &str) -> Vec<SiteDefinition> {
    let ids: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect();

    let available = all
        .iter()
        .map(|site| site.id().to_owned())
        .collect::<Vec<_>>()
        .join(", ");

    let filtered: Vec<SiteDefinition> = all
        .into_iter()
        .filter(|site| ids.contains(&site.id()))
        .collect();

    if filtered.is_empty() {
        log::warn!("No matching sites found for filter {ids:?}. Available: {available}");
    }

    filtered
}
