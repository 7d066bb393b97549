use std::fmt;

use chrono::{Month, NaiveDate, Weekday};
use serde::{Serialize, Serializer};

use crate::{FieldValue, Record, RecordKind};

/// Forecast columns in canonical order.
pub const FORECAST_COLUMNS: &[&str] = &[
    "location",
    "updated_date",
    "forecast_date",
    "min_temp",
    "max_temp",
    "condition",
    "possible_rainfall",
    "chance_of_rain",
    "forecast",
    "warning",
];

/// Date format used for the document-scoped "updated on" date.
const UPDATED_DATE_FORMAT: &str = "%A %d %B %Y";

/// One day of a location's weather forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Location name, capitalized (e.g. `"Sydney"`).
    pub location: String,
    /// When the source published the forecast.
    pub updated_date: FieldValue<NaiveDate>,
    /// The day being forecast. Carries no year.
    pub forecast_date: FieldValue<ForecastDate>,
    /// Minimum temperature in °C.
    pub min_temp: FieldValue<i32>,
    /// Maximum temperature in °C.
    pub max_temp: FieldValue<i32>,
    /// Short condition summary (e.g. `"Mostly sunny."`).
    pub condition: FieldValue<String>,
    /// Possible rainfall in millimetres.
    pub possible_rainfall: FieldValue<Rainfall>,
    /// Chance of any rain, 0–100.
    pub chance_of_rain: FieldValue<u8>,
    /// Narrative forecast text.
    pub forecast: FieldValue<String>,
    /// Weather warning text.
    pub warning: FieldValue<String>,
}

impl Record for Forecast {
    const COLUMNS: &'static [&'static str] = FORECAST_COLUMNS;
    const KIND: RecordKind = RecordKind::Forecast;

    fn identity(&self) -> &str {
        &self.location
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.location.clone(),
            self.updated_date
                .map(|date| date.format(UPDATED_DATE_FORMAT).to_string())
                .to_string(),
            self.forecast_date.to_string(),
            self.min_temp.to_string(),
            self.max_temp.to_string(),
            self.condition.to_string(),
            self.possible_rainfall.to_string(),
            self.chance_of_rain.to_string(),
            self.forecast.to_string(),
            self.warning.to_string(),
        ]
    }
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Updated Date - {}, Forecast Date - {}, Min Temp - {}°C, Max Temp - {}°C, \
             Condition - {}, Possible Rainfall - {} mm, Chance of Rain - {}%, \
             Forecast - {}, Warning - {}",
            self.location,
            self.updated_date,
            self.forecast_date,
            self.min_temp,
            self.max_temp,
            self.condition,
            self.possible_rainfall,
            self.chance_of_rain,
            self.forecast,
            self.warning,
        )
    }
}

/// A calendar day without a year, as printed on forecast day headings
/// (e.g. `"Tuesday 02 January"`).
///
/// The year is implicit in the source. [`Self::in_year`] resolves a concrete
/// date for a year the caller picks; nothing here guesses across a
/// December/January boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForecastDate {
    weekday: Weekday,
    month: u32,
    day: u32,
}

impl ForecastDate {
    /// Creates a forecast date, returning `None` if `month`/`day` is not a
    /// valid calendar day in any year.
    #[must_use]
    pub fn new(weekday: Weekday, month: u32, day: u32) -> Option<Self> {
        // 2000 is a leap year, so 29 February is accepted.
        NaiveDate::from_ymd_opt(2000, month, day)?;
        Some(Self {
            weekday,
            month,
            day,
        })
    }

    /// The weekday printed alongside the date.
    #[must_use]
    pub const fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Month number, 1–12.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Day of the month, 1–31.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Resolves the date in `year`, or `None` if it does not exist there
    /// (29 February outside a leap year).
    #[must_use]
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

impl fmt::Display for ForecastDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("", |m| m.name());
        write!(
            f,
            "{} {:02} {month}",
            weekday_name(self.weekday),
            self.day
        )
    }
}

impl Serialize for ForecastDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Possible rainfall in millimetres.
///
/// Forecast pages usually print a range (`"0 to 2 mm"`); hand-edited files
/// often hold a single amount (`"5 mm"`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rainfall {
    /// A single amount.
    Amount(f64),
    /// An inclusive range.
    Range {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
}

impl fmt::Display for Rainfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(amount) => write!(f, "{amount}"),
            Self::Range { low, high } => write!(f, "{low} to {high}"),
        }
    }
}

impl Serialize for Rainfall {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Amount(amount) => serializer.serialize_f64(*amount),
            Self::Range { .. } => serializer.collect_str(self),
        }
    }
}
