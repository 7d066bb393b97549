//! Construction of canonical records from ordered field texts.
//!
//! Values arrive in column order (see
//! [`Record::COLUMNS`](fieldscrape_record_models::Record::COLUMNS)). The
//! count must match the arity exactly; any other count is rejected before
//! a single field is looked at.

use fieldscrape_record_models::{FieldValue, Forecast, Movie, Record};

use crate::RecordError;
use crate::normalize::{
    capitalize_words, is_sentinel, parse_forecast_date, parse_long_date, parse_percent,
    parse_rainfall, parse_temperature,
};

const LONG_DATE_HINT: &str = "expected a date like 'Monday 01 January 2024'";
const SHORT_DATE_HINT: &str = "expected a date like 'Tuesday 02 January'";
const TEMPERATURE_HINT: &str = "expected whole degrees °C";
const RAINFALL_HINT: &str = "expected millimetres or a 'low to high' range";
const PERCENT_HINT: &str = "expected a percentage between 0 and 100";

/// Builds a record from one unit's ordered field texts.
pub trait RecordBuilder: Record + Sized {
    /// Builds a record from exactly `Self::COLUMNS.len()` values.
    ///
    /// Blank values and the sentinel become
    /// [`FieldValue::Missing`]; anything else must convert.
    ///
    /// # Errors
    ///
    /// * [`RecordError::Arity`] if the value count is wrong
    /// * [`RecordError::EmptyIdentity`] if the identity is blank
    /// * [`RecordError::Conversion`] if a typed field does not convert
    fn build<S: AsRef<str>>(values: &[S]) -> Result<Self, RecordError>;
}

impl RecordBuilder for Forecast {
    fn build<S: AsRef<str>>(values: &[S]) -> Result<Self, RecordError> {
        let fields = Fields::new::<Self>(values)?;

        Ok(Self {
            location: capitalize_words(fields.identity()?),
            updated_date: fields.typed(1, parse_long_date, LONG_DATE_HINT)?,
            forecast_date: fields.typed(2, parse_forecast_date, SHORT_DATE_HINT)?,
            min_temp: fields.typed(3, parse_temperature, TEMPERATURE_HINT)?,
            max_temp: fields.typed(4, parse_temperature, TEMPERATURE_HINT)?,
            condition: fields.text(5),
            possible_rainfall: fields.typed(6, parse_rainfall, RAINFALL_HINT)?,
            chance_of_rain: fields.typed(7, parse_percent, PERCENT_HINT)?,
            forecast: fields.text(8),
            warning: fields.text(9),
        })
    }
}

impl RecordBuilder for Movie {
    fn build<S: AsRef<str>>(values: &[S]) -> Result<Self, RecordError> {
        let fields = Fields::new::<Self>(values)?;

        Ok(Self {
            title: fields.identity()?.to_string(),
            director: fields.text(1),
            screenwriter: fields.text(2),
            distributor: fields.text(3),
            production_co: fields.text(4),
            rating: fields.text(5),
            genre: fields.text(6),
            original_language: fields.text(7),
            release_date: fields.text(8),
            box_office: fields.text(9),
            sound_mix: fields.text(10),
            aspect_ratio: fields.text(11),
            tomatometer: fields.typed(12, parse_percent, PERCENT_HINT)?,
            audience_score: fields.typed(13, parse_percent, PERCENT_HINT)?,
        })
    }
}

/// Arity-checked view over one unit's values.
struct Fields<'a, S> {
    columns: &'static [&'static str],
    values: &'a [S],
}

impl<'a, S: AsRef<str>> Fields<'a, S> {
    fn new<R: Record>(values: &'a [S]) -> Result<Self, RecordError> {
        if values.len() != R::COLUMNS.len() {
            return Err(RecordError::Arity {
                expected: R::COLUMNS.len(),
                found: values.len(),
            });
        }
        Ok(Self {
            columns: R::COLUMNS,
            values,
        })
    }

    fn raw(&self, index: usize) -> &'a str {
        self.values[index].as_ref().trim()
    }

    fn identity(&self) -> Result<&'a str, RecordError> {
        let raw = self.raw(0);
        if is_sentinel(raw) {
            return Err(RecordError::EmptyIdentity {
                field: self.columns[0],
            });
        }
        Ok(raw)
    }

    fn text(&self, index: usize) -> FieldValue<String> {
        let raw = self.raw(index);
        if is_sentinel(raw) {
            FieldValue::Missing
        } else {
            FieldValue::Present(raw.to_string())
        }
    }

    fn typed<T>(
        &self,
        index: usize,
        convert: impl FnOnce(&str) -> Option<T>,
        reason: &str,
    ) -> Result<FieldValue<T>, RecordError> {
        let raw = self.raw(index);
        if is_sentinel(raw) {
            return Ok(FieldValue::Missing);
        }
        convert(raw)
            .map(FieldValue::Present)
            .ok_or_else(|| RecordError::Conversion {
                field: self.columns[index],
                raw: raw.to_string(),
                reason: reason.to_string(),
            })
    }
}
