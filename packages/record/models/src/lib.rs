#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical record types shared by every extraction path.
//!
//! Both the page scraper and the tabular reader produce the same
//! [`Forecast`] and [`Movie`] shapes. Every record of a kind has the same
//! fixed arity and column order (see [`Record::COLUMNS`]); a field that
//! could not be located is carried as [`FieldValue::Missing`], which renders
//! as the [`SENTINEL`] text rather than shortening the row.

mod collection;
mod forecast;
mod movie;
mod value;

pub use collection::Collection;
pub use forecast::{FORECAST_COLUMNS, Forecast, ForecastDate, Rainfall};
pub use movie::{MOVIE_COLUMNS, Movie};
pub use value::{FieldValue, SENTINEL};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Header of the provenance column appended to every persisted row.
pub const RETRIEVED_AT_COLUMN: &str = "retrieved_at";

/// Format of the retrieval timestamp: `2024-01-01 16:20:00`.
pub const RETRIEVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The kind of record a source produces.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordKind {
    /// Daily weather forecast.
    Forecast,
    /// Movie detail page.
    Movie,
}

/// A canonical, fixed-arity record.
pub trait Record {
    /// Column names in canonical order. The first column is the identity.
    const COLUMNS: &'static [&'static str];

    /// Which kind of record this is.
    const KIND: RecordKind;

    /// The identity field (location name or movie title).
    fn identity(&self) -> &str;

    /// Renders every field as text, in [`Self::COLUMNS`] order.
    ///
    /// The output always has exactly `COLUMNS.len()` entries; missing
    /// fields render as [`SENTINEL`].
    fn to_row(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn record_kind_round_trips_through_strings() {
        assert_eq!(RecordKind::Forecast.to_string(), "forecast");
        assert_eq!(RecordKind::from_str("movie").unwrap(), RecordKind::Movie);
        assert!(RecordKind::from_str("weather").is_err());
    }
}
