//! Menu-driven front end used when no subcommand is given.

use std::path::PathBuf;
use std::str::FromStr;

use dialoguer::{Confirm, Input, MultiSelect, Select};
use fieldscrape_cli_utils::MultiProgress;
use fieldscrape_record_models::RecordKind;
use fieldscrape_scraper::all_sites;

use crate::commands::{self, FetchArgs};

enum Action {
    ScrapeSite,
    ScrapeSites,
    ReadFile,
    ListSites,
}

impl Action {
    const ALL: &[Self] = &[
        Self::ScrapeSite,
        Self::ScrapeSites,
        Self::ReadFile,
        Self::ListSites,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ScrapeSite => "Scrape a site",
            Self::ScrapeSites => "Scrape several sites",
            Self::ReadFile => "Read a CSV file",
            Self::ListSites => "List sites",
        }
    }
}

/// Prompts for an action and its parameters, then runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen action fails.
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("fieldscrape");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::ScrapeSite => scrape_site(multi).await?,
        Action::ScrapeSites => scrape_sites(multi).await?,
        Action::ReadFile => read_file()?,
        Action::ListSites => commands::list_sites(),
    }

    Ok(())
}

fn site_labels() -> (Vec<String>, Vec<String>) {
    all_sites()
        .iter()
        .map(|s| (s.id().to_owned(), format!("{} ({}, {})", s.id(), s.kind, s.name())))
        .unzip()
}

async fn scrape_site(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let (ids, labels) = site_labels();
    if ids.is_empty() {
        println!("No sites configured.");
        return Ok(());
    }

    let idx = Select::new()
        .with_prompt("Which site?")
        .items(&labels)
        .default(0)
        .interact()?;

    let limit = prompt_optional("Page limit (empty for no limit)")?;

    let fetch = FetchArgs {
        delay_ms: prompt_optional("Delay between fetches in ms (empty for none)")?,
        ..FetchArgs::default()
    };

    commands::scrape(multi, &ids[idx], None, limit, None, &fetch).await
}

async fn scrape_sites(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let (ids, labels) = site_labels();

    let selected = MultiSelect::new()
        .with_prompt("Select sites (space=toggle, a=all, enter=confirm)")
        .items(&labels)
        .interact()?;

    if selected.is_empty() {
        println!("No sites selected.");
        return Ok(());
    }

    let filter = selected
        .iter()
        .map(|&i| ids[i].as_str())
        .collect::<Vec<_>>()
        .join(",");

    commands::scrape_all(multi, Some(filter), None, &FetchArgs::default()).await
}

fn read_file() -> Result<(), Box<dyn std::error::Error>> {
    let path: String = Input::new().with_prompt("CSV file").interact_text()?;

    let kinds = [RecordKind::Forecast, RecordKind::Movie];
    let kind_labels: Vec<String> = kinds.iter().map(ToString::to_string).collect();
    let kind = Select::new()
        .with_prompt("Record kind")
        .items(&kind_labels)
        .default(0)
        .interact()?;

    let json = Confirm::new()
        .with_prompt("Print records as JSON?")
        .default(false)
        .interact()?;

    commands::read(&PathBuf::from(path.trim()), kinds[kind], b',', json)
}

fn prompt_optional<T>(prompt: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    if input.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.trim().parse()?))
    }
}
