#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `fieldscrape` command-line entry point.
//!
//! Scrapes registered sites into append-only CSV files and reads CSV files
//! back into canonical records. Run without a subcommand for an
//! interactive menu.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::FetchArgs;
use fieldscrape_record_models::RecordKind;

#[derive(Parser)]
#[command(name = "fieldscrape", about = "Forecast and movie record extraction")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all registered sites
    Sites,
    /// Scrape one site and append its records to a CSV file
    Scrape {
        /// Site identifier (e.g., "`scu_weather`")
        site: String,
        /// Comma-separated addresses to scrape instead of the site's own
        #[arg(long)]
        urls: Option<String>,
        /// Maximum number of pages (forecasts) or detail pages (movies)
        #[arg(long)]
        limit: Option<usize>,
        /// Output file (defaults to the site's file in the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Scrape every enabled site, each into its own CSV file
    ScrapeAll {
        /// Comma-separated site IDs
        #[arg(long, env = "FIELDSCRAPE_SITES")]
        sites: Option<String>,
        /// Directory for output files
        #[arg(long, env = "FIELDSCRAPE_DATA_DIR")]
        output_dir: Option<PathBuf>,
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Read records from a CSV file
    Read {
        /// File to read
        path: PathBuf,
        /// Kind of record the file holds
        #[arg(long, default_value = "forecast")]
        kind: RecordKind,
        /// Field delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,
        /// Print every record as a JSON line instead of the distinct identities
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = fieldscrape_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi).await;
    };

    match command {
        Commands::Sites => commands::list_sites(),
        Commands::Scrape {
            site,
            urls,
            limit,
            output,
            fetch,
        } => {
            let urls = urls.map(|urls| commands::split_list(&urls));
            commands::scrape(&multi, &site, urls, limit, output, &fetch).await?;
        }
        Commands::ScrapeAll {
            sites,
            output_dir,
            fetch,
        } => {
            commands::scrape_all(&multi, sites, output_dir, &fetch).await?;
        }
        Commands::Read {
            path,
            kind,
            delimiter,
            json,
        } => {
            let delimiter = commands::delimiter_byte(delimiter)?;
            commands::read(&path, kind, delimiter, json)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_accepts_fetch_flags() {
        let cli = Cli::try_parse_from([
            "fieldscrape",
            "scrape",
            "scu_weather",
            "--limit",
            "2",
            "--delay-ms",
            "500",
            "--timeout",
            "10",
            "--header",
            "Accept-Language: en-AU",
        ])
        .unwrap();

        let Some(Commands::Scrape {
            site, limit, fetch, ..
        }) = cli.command
        else {
            panic!("expected scrape");
        };
        assert_eq!(site, "scu_weather");
        assert_eq!(limit, Some(2));
        assert_eq!(fetch.delay_ms, Some(500));
        assert_eq!(fetch.timeout, Some(10));
        assert_eq!(
            fetch.headers,
            vec![("Accept-Language".to_owned(), "en-AU".to_owned())]
        );
    }

    #[test]
    fn malformed_header_flag_is_rejected() {
        assert!(
            Cli::try_parse_from(["fieldscrape", "scrape", "scu_weather", "--header", "nope"])
                .is_err()
        );
    }

    #[test]
    fn no_subcommand_selects_interactive_mode() {
        assert!(Cli::try_parse_from(["fieldscrape"]).unwrap().command.is_none());
    }
}
