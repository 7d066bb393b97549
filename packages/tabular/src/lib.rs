#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reads canonical records from delimited text files.
//!
//! The first line is a header and is skipped without validation. Every
//! following line is split into positional tokens and handed to the same
//! [`RecordBuilder`] the page scraper uses, so a file row and a scraped
//! unit normalize identically. A bad line is reported and skipped; a file
//! that cannot be opened or decoded yields nothing.
//!
//! Files need not be UTF-8. A byte order mark wins; otherwise bytes that
//! are not valid UTF-8 are decoded with the encoding `chardetng` guesses.

use std::path::{Path, PathBuf};

use chardetng::EncodingDetector;
use chrono::NaiveDateTime;
use encoding_rs::{Encoding, UTF_8};
use fieldscrape_extract::token::all_tokens;
use fieldscrape_record::RecordBuilder;
use fieldscrape_record::diagnostics::Diagnostics;
use fieldscrape_record_models::{Collection, RETRIEVED_AT_FORMAT};

/// Errors that make a whole file unreadable.
#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    /// The file could not be opened or read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file holds byte sequences its encoding cannot decode.
    #[error("{} is not valid {encoding}", .path.display())]
    Encoding {
        /// The file.
        path: PathBuf,
        /// Name of the encoding the file was decoded with.
        encoding: &'static str,
    },
}

/// A line that did not become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 1-based line number in the source text.
    pub line: u64,
    /// The line as it appeared in the source.
    pub raw: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Records and rejections from one read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOutcome<R> {
    /// Records built, in file order.
    pub records: Collection<R>,
    /// Lines that were skipped.
    pub rejected: Vec<RejectedRow>,
}

impl<R> Default for ReadOutcome<R> {
    fn default() -> Self {
        Self {
            records: Collection::new(),
            rejected: Vec::new(),
        }
    }
}

/// Delimited text reader.
#[derive(Debug, Clone, Copy)]
pub struct TabularReader {
    delimiter: u8,
}

impl Default for TabularReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl TabularReader {
    /// Creates a comma-delimited reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV files).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Reads every record from the file at `path`.
    ///
    /// A missing or undecodable file is reported to `diagnostics` and
    /// yields an empty outcome.
    pub fn read_path<R: RecordBuilder>(
        &self,
        path: &Path,
        diagnostics: &dyn Diagnostics,
    ) -> ReadOutcome<R> {
        match self.try_read_path(path, diagnostics) {
            Ok(outcome) => outcome,
            Err(e) => {
                diagnostics.error(&e.to_string());
                ReadOutcome::default()
            }
        }
    }

    /// Like [`Self::read_path`], but returns file-level failures to the
    /// caller instead of reporting them.
    ///
    /// # Errors
    ///
    /// * [`TabularError::Io`] if the file cannot be read
    /// * [`TabularError::Encoding`] if its content cannot be decoded
    pub fn try_read_path<R: RecordBuilder>(
        &self,
        path: &Path,
        diagnostics: &dyn Diagnostics,
    ) -> Result<ReadOutcome<R>, TabularError> {
        let bytes = std::fs::read(path).map_err(|source| TabularError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (text, encoding) = decode(&bytes).map_err(|encoding| TabularError::Encoding {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        })?;

        if encoding == UTF_8 {
            log::debug!("Reading {}", path.display());
        } else {
            log::info!("Reading {} as {}", path.display(), encoding.name());
        }
        Ok(self.read_str(&text, diagnostics))
    }

    /// Reads every record from `text`, whose first line is a header.
    pub fn read_str<R: RecordBuilder>(
        &self,
        text: &str,
        diagnostics: &dyn Diagnostics,
    ) -> ReadOutcome<R> {
        let lines: Vec<&str> = text.lines().collect();
        let raw_line = |line: u64| {
            usize::try_from(line)
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| lines.get(i))
                .map_or_else(String::new, |l| (*l).to_owned())
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut outcome = ReadOutcome::default();

        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map_or(0, csv::Position::line);
                    reject(&mut outcome, diagnostics, line, raw_line(line), &e.to_string());
                    continue;
                }
            };
            let line = record.position().map_or(0, csv::Position::line);

            let mut tokens: Vec<&str> = record.iter().collect();
            if tokens.len() == R::COLUMNS.len() + 1
                && tokens.last().is_some_and(|last| is_timestamp(last))
            {
                tokens.pop();
            }

            match R::build(&all_tokens(tokens)) {
                Ok(built) => outcome.records.push(built),
                Err(e) => reject(&mut outcome, diagnostics, line, raw_line(line), &e.to_string()),
            }
        }

        log::debug!(
            "Read {} record(s), rejected {} line(s)",
            outcome.records.len(),
            outcome.rejected.len()
        );

        outcome
    }
}

fn reject<R>(
    outcome: &mut ReadOutcome<R>,
    diagnostics: &dyn Diagnostics,
    line: u64,
    raw: String,
    reason: &str,
) {
    diagnostics.warn(&format!("line {line}: {reason}: {raw:?}"));
    outcome.rejected.push(RejectedRow {
        line,
        raw,
        reason: reason.to_owned(),
    });
}

/// Decodes `bytes` with the encoding its byte order mark names, as UTF-8
/// when valid, or with the detected encoding. Fails with the encoding used
/// if malformed sequences remain.
fn decode(bytes: &[u8]) -> Result<(String, &'static Encoding), &'static Encoding> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => {
            if let Ok(text) = std::str::from_utf8(bytes) {
                return Ok((text.to_owned(), UTF_8));
            }
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            (detector.guess(None, false), bytes)
        }
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        Err(encoding)
    } else {
        Ok((text.into_owned(), encoding))
    }
}

fn is_timestamp(token: &str) -> bool {
    NaiveDateTime::parse_from_str(token.trim(), RETRIEVED_AT_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use fieldscrape_record::diagnostics::MemoryDiagnostics;
    use fieldscrape_record_models::{FieldValue, Forecast, Movie, Rainfall};

    use super::*;

    const HEADER: &str = "Location,Updated,Date,Min,Max,Condition,Rainfall,Chance,Forecast,Warning";
    const SYDNEY: &str =
        "Sydney,Monday 01 January 2024,Tuesday 02 January,20°C,28°C,Sunny,5 mm,30%,Fine and sunny,None";

    fn read(text: &str) -> (ReadOutcome<Forecast>, MemoryDiagnostics) {
        let diagnostics = MemoryDiagnostics::new();
        let outcome = TabularReader::new().read_str(text, &diagnostics);
        (outcome, diagnostics)
    }

    #[test]
    fn reads_example_line() {
        let (outcome, diagnostics) = read(&format!("{HEADER}\n{SYDNEY}\n"));

        assert!(outcome.rejected.is_empty());
        assert!(diagnostics.events().is_empty());
        let forecast = &outcome.records.as_slice()[0];
        assert_eq!(forecast.location, "Sydney");
        assert_eq!(forecast.min_temp, FieldValue::Present(20));
        assert_eq!(
            forecast.possible_rainfall,
            FieldValue::Present(Rainfall::Amount(5.0))
        );
        assert_eq!(forecast.warning, FieldValue::Present("None".to_owned()));
    }

    #[test]
    fn header_line_is_skipped_even_if_it_looks_like_data() {
        let (outcome, _) = read(&format!("{SYDNEY}\n{SYDNEY}\n"));
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn malformed_lines_are_skipped_with_line_numbers() {
        let text = format!(
            "{HEADER}\n{SYDNEY}\nBrisbane,Monday 01 January 2024,Tuesday 02 January,hot,30°C\n\
             Perth,Monday 01 January 2024,Tuesday 02 January,warm°C,28°C,Sunny,5 mm,30%,x,y\n\
             Melbourne,Monday 01 January 2024,Tuesday 02 January,12°C,22°C,Showers,N/A,80%,Rain,N/A\n\
             Darwin,Funday 40 January 2024,Tuesday 02 January,25°C,33°C,Storms,10 mm,90%,Wet,N/A\n"
        );
        let (outcome, diagnostics) = read(&text);

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.rejected.len(), 3);
        assert_eq!(outcome.rejected[0].line, 3);
        assert!(outcome.rejected[0].raw.starts_with("Brisbane"));
        assert!(outcome.rejected[0].reason.contains("expected 10 fields"));
        assert_eq!(outcome.rejected[1].line, 4);
        assert!(outcome.rejected[1].reason.contains("warm°C"));
        assert_eq!(outcome.rejected[2].line, 6);
        assert!(outcome.rejected[2].raw.starts_with("Darwin,Funday 40 January 2024"));
        assert!(outcome.rejected[2].reason.contains("updated_date"));
        assert!(outcome.rejected[2].reason.contains("Funday 40 January 2024"));
        assert_eq!(diagnostics.count(log::Level::Warn), 3);

        let melbourne = &outcome.records.as_slice()[1];
        assert!(melbourne.possible_rainfall.is_missing());
        assert!(melbourne.warning.is_missing());
    }

    #[test]
    fn trailing_retrieval_timestamp_is_ignored() {
        let (outcome, _) = read(&format!("{HEADER},retrieved_at\n{SYDNEY},2024-01-01 16:20:00\n"));
        assert_eq!(outcome.records.len(), 1);

        let (outcome, _) = read(&format!("{HEADER}\n{SYDNEY},not a timestamp\n"));
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn custom_delimiter() {
        let text = format!("{}\n{}\n", HEADER.replace(',', "\t"), SYDNEY.replace(',', "\t"));
        let diagnostics = MemoryDiagnostics::new();
        let outcome: ReadOutcome<Forecast> = TabularReader::new()
            .with_delimiter(b'\t')
            .read_str(&text, &diagnostics);
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn quoted_movie_fields_keep_their_delimiters() {
        let text = "Title,...\n\"Dune: Part Two\",Denis Villeneuve,\"Jon Spaihts, Denis Villeneuve\",\
                    N/A,N/A,PG-13,\"Sci-Fi, Adventure\",English,N/A,N/A,N/A,N/A,92%,95%\n";
        let diagnostics = MemoryDiagnostics::new();
        let outcome: ReadOutcome<Movie> = TabularReader::new().read_str(text, &diagnostics);

        let movie = &outcome.records.as_slice()[0];
        assert_eq!(
            movie.screenwriter,
            FieldValue::Present("Jon Spaihts, Denis Villeneuve".to_owned())
        );
        assert_eq!(movie.audience_score, FieldValue::Present(95));
    }

    #[test]
    fn missing_file_yields_empty_outcome() {
        let path = std::env::temp_dir().join("fieldscrape_tabular_missing.csv");
        let _ = std::fs::remove_file(&path);

        let diagnostics = MemoryDiagnostics::new();
        let outcome: ReadOutcome<Forecast> = TabularReader::new().read_path(&path, &diagnostics);

        assert!(outcome.records.is_empty());
        assert_eq!(diagnostics.count(log::Level::Error), 1);
    }

    fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join("fieldscrape_tabular_encoding");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn drops_utf8_byte_order_mark() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(format!("{HEADER}\n{SYDNEY}\n").as_bytes());
        let path = write_temp("bom.csv", &bytes);

        let diagnostics = MemoryDiagnostics::new();
        let outcome: ReadOutcome<Forecast> = TabularReader::new().read_path(&path, &diagnostics);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records.as_slice()[0].location, "Sydney");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn reads_latin1_rows() {
        let text = format!(
            "{HEADER}\n\
             São Paulo,Monday 01 January 2024,Tuesday 02 January,20°C,28°C,Céu nublado,5 mm,30%,\
             Chuva à tarde e possível trovoada,Atenção: ventos fortes\n\
             Belém,Monday 01 January 2024,Tuesday 02 January,24°C,31°C,Pancadas de chuva,12 mm,80%,\
             Calor e umidade elevada na região,N/A\n\
             Maceió,Monday 01 January 2024,Tuesday 02 January,22°C,29°C,Céu limpo,N/A,10%,\
             Ensolarado com brisa do oceano,N/A\n"
        );
        let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(&text);
        assert!(!unmappable);
        assert!(std::str::from_utf8(&bytes).is_err());
        let path = write_temp("latin1.csv", &bytes);

        let diagnostics = MemoryDiagnostics::new();
        let outcome: ReadOutcome<Forecast> = TabularReader::new().read_path(&path, &diagnostics);

        assert!(diagnostics.events().is_empty());
        assert_eq!(outcome.records.len(), 3);
        let sao_paulo = &outcome.records.as_slice()[0];
        assert_eq!(sao_paulo.location, "São Paulo");
        assert_eq!(sao_paulo.min_temp, FieldValue::Present(20));
        assert_eq!(sao_paulo.max_temp, FieldValue::Present(28));
        assert_eq!(
            sao_paulo.condition,
            FieldValue::Present("Céu nublado".to_owned())
        );
        assert_eq!(outcome.records.as_slice()[2].location, "Maceió");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn undecodable_bytes_are_an_encoding_error() {
        // UTF-16LE byte order mark, "A", then an unpaired low surrogate.
        let path = write_temp("broken_utf16.csv", &[0xFF, 0xFE, b'A', 0x00, 0x00, 0xDC]);

        let diagnostics = MemoryDiagnostics::new();
        let err = TabularReader::new()
            .try_read_path::<Forecast>(&path, &diagnostics)
            .unwrap_err();
        assert!(matches!(err, TabularError::Encoding { encoding: "UTF-16LE", .. }));

        let outcome: ReadOutcome<Forecast> = TabularReader::new().read_path(&path, &diagnostics);
        assert!(outcome.records.is_empty());
        assert_eq!(diagnostics.count(log::Level::Error), 1);
        std::fs::remove_file(&path).ok();
    }
}
