#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Append-only CSV persistence for canonical records.
//!
//! [`CsvSink::append`] writes the header only when the destination is
//! empty, then one row per record followed by a retrieval timestamp. The
//! timestamp is taken once per call, so every row of one write carries the
//! same value. Rows render fields in the grammar the tabular reader
//! accepts, so a sink file can be read back.

pub mod paths;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use fieldscrape_record_models::{Collection, RETRIEVED_AT_COLUMN, RETRIEVED_AT_FORMAT, Record};

/// Errors raised while writing to a destination.
///
/// These are the only failures in the pipeline that propagate to the
/// caller: rows already written stay written.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The destination or its directory could not be created or opened.
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        /// The destination.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A row could not be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Appends records to delimited text files.
#[derive(Debug, Clone, Copy)]
pub struct CsvSink {
    delimiter: u8,
}

impl Default for CsvSink {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvSink {
    /// Creates a comma-delimited sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Appends `records` to `path` stamped with the current local time.
    ///
    /// # Errors
    ///
    /// See [`Self::append`].
    pub fn append_now<R: Record>(
        &self,
        path: &Path,
        records: Collection<R>,
    ) -> Result<usize, SinkError> {
        self.append(path, records, Local::now().naive_local())
    }

    /// Appends `records` to `path`, creating the file and its parent
    /// directories if needed. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// * [`SinkError::Io`] if the directory or file cannot be created or opened
    /// * [`SinkError::Csv`] if a row cannot be written
    pub fn append<R: Record>(
        &self,
        path: &Path,
        records: Collection<R>,
        retrieved_at: NaiveDateTime,
    ) -> Result<usize, SinkError> {
        let io_error = |source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_error)?;
        let is_empty = file.metadata().map_err(io_error)?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(file);

        if is_empty {
            writer.write_record(R::COLUMNS.iter().copied().chain([RETRIEVED_AT_COLUMN]))?;
        }

        let stamp = retrieved_at.format(RETRIEVED_AT_FORMAT).to_string();
        let mut written = 0;
        for record in records {
            let row = record.to_row();
            writer.write_record(row.iter().map(String::as_str).chain([stamp.as_str()]))?;
            written += 1;
        }

        writer.flush().map_err(io_error)?;

        log::info!("Appended {written} row(s) to {}", path.display());
        Ok(written)
    }
}
