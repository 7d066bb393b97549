//! Field normalization rules shared by the scrape and tabular paths.
//!
//! Date grammar, unit stripping, numeric conversion, and identity
//! capitalization. Parsers return `None` on failure; callers decide
//! whether that is a sentinel or a per-record error.

use chrono::NaiveDate;
use chrono::format::{Parsed, StrftimeItems, parse};
use fieldscrape_record_models::{ForecastDate, Rainfall, SENTINEL};

/// Unit printed after temperatures.
pub const CELSIUS: &str = "°C";

/// Unit printed after rainfall amounts.
pub const MILLIMETRES: &str = "mm";

/// Unit printed after probabilities.
pub const PERCENT: &str = "%";

/// Long date grammar: `Monday 01 January 2024`.
const LONG_DATE_FORMAT: &str = "%A %d %B %Y";

/// Year-less date grammar: `Tuesday 02 January`.
const SHORT_DATE_FORMAT: &str = "%A %d %B";

/// Returns `true` for text that stands for a missing value: blank, or the
/// sentinel in any letter case.
#[must_use]
pub fn is_sentinel(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(SENTINEL)
}

/// Collapses every run of whitespace to a single space and trims the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips every trailing occurrence of `unit` (and surrounding whitespace).
///
/// Stripping is idempotent: applying it to its own output is a no-op.
#[must_use]
pub fn strip_unit<'a>(text: &'a str, unit: &str) -> &'a str {
    let mut stripped = text.trim();
    if unit.is_empty() {
        return stripped;
    }
    while let Some(rest) = stripped.strip_suffix(unit) {
        stripped = rest.trim_end();
    }
    stripped
}

/// Parses a date of the form `Monday 01 January 2024`.
///
/// Abbreviated names (`Mon 1 Jan 2024`) and a trailing full stop are
/// accepted. The weekday must agree with the calendar.
#[must_use]
pub fn parse_long_date(text: &str) -> Option<NaiveDate> {
    let cleaned = clean_date_text(text);
    NaiveDate::parse_from_str(&cleaned, LONG_DATE_FORMAT).ok()
}

/// Parses a year-less date of the form `Tuesday 02 January`.
///
/// A date that does carry a year is accepted too; the year is dropped.
#[must_use]
pub fn parse_forecast_date(text: &str) -> Option<ForecastDate> {
    if let Some(date) = parse_long_date(text) {
        use chrono::Datelike as _;
        return ForecastDate::new(date.weekday(), date.month(), date.day());
    }

    let cleaned = clean_date_text(text);
    let mut parsed = Parsed::new();
    parse(&mut parsed, &cleaned, StrftimeItems::new(SHORT_DATE_FORMAT)).ok()?;
    ForecastDate::new(parsed.weekday()?, parsed.month()?, parsed.day()?)
}

/// Parses a whole-degree temperature such as `"20°C"` or `"-3"`.
#[must_use]
pub fn parse_temperature(text: &str) -> Option<i32> {
    strip_unit(text, CELSIUS).parse().ok()
}

/// Parses a percentage such as `"30%"`. Values above 100 are rejected.
#[must_use]
pub fn parse_percent(text: &str) -> Option<u8> {
    strip_unit(text, PERCENT)
        .parse::<u8>()
        .ok()
        .filter(|value| *value <= 100)
}

/// Parses a rainfall amount (`"5 mm"`) or range (`"0 to 2 mm"`).
#[must_use]
pub fn parse_rainfall(text: &str) -> Option<Rainfall> {
    let magnitude = strip_unit(text, MILLIMETRES);

    if let Some((low, high)) = magnitude.split_once(" to ") {
        let low = parse_amount(low)?;
        let high = parse_amount(high)?;
        if low > high {
            return None;
        }
        return Some(Rainfall::Range { low, high });
    }

    parse_amount(magnitude).map(Rainfall::Amount)
}

fn parse_amount(text: &str) -> Option<f64> {
    let amount = strip_unit(text, MILLIMETRES).parse::<f64>().ok()?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

/// Capitalizes each word of a location name: `"gold coast"` becomes
/// `"Gold Coast"`, `"SYDNEY"` becomes `"Sydney"`. Underscores and hyphens
/// separate words.
#[must_use]
pub fn capitalize_words(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn clean_date_text(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    collapsed.trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    #[test]
    fn recognises_sentinels() {
        assert!(is_sentinel("N/A"));
        assert!(is_sentinel(" n/a "));
        assert!(is_sentinel(""));
        assert!(!is_sentinel("None"));
    }

    #[test]
    fn strips_trailing_units() {
        assert_eq!(strip_unit("20°C", CELSIUS), "20");
        assert_eq!(strip_unit(" 5 mm ", MILLIMETRES), "5");
        assert_eq!(strip_unit("5mm", MILLIMETRES), "5");
        assert_eq!(strip_unit("30%", PERCENT), "30");
        assert_eq!(strip_unit("Sunny", CELSIUS), "Sunny");
    }

    #[test]
    fn unit_stripping_is_idempotent() {
        for (raw, unit) in [
            ("20°C", CELSIUS),
            ("20", CELSIUS),
            ("5 mm mm", MILLIMETRES),
            ("0 to 2 mm", MILLIMETRES),
            ("30 %", PERCENT),
            ("", PERCENT),
        ] {
            let once = strip_unit(raw, unit);
            assert_eq!(strip_unit(once, unit), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn parses_long_dates() {
        assert_eq!(
            parse_long_date("Monday 01 January 2024"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            parse_long_date("Wednesday 3 April 2024."),
            NaiveDate::from_ymd_opt(2024, 4, 3)
        );
        assert!(parse_long_date("Tuesday 01 January 2024").is_none());
        assert!(parse_long_date("2024-01-01").is_none());
    }

    #[test]
    fn parses_year_less_dates() {
        let date = parse_forecast_date("Tuesday 02 January").unwrap();
        assert_eq!(date.weekday(), Weekday::Tue);
        assert_eq!((date.month(), date.day()), (1, 2));

        let with_year = parse_forecast_date("Tuesday 02 January 2024").unwrap();
        assert_eq!(with_year, date);

        assert!(parse_forecast_date("Tomorrow").is_none());
        assert!(parse_forecast_date("Friday 31 February").is_none());
    }

    #[test]
    fn parses_numeric_fields() {
        assert_eq!(parse_temperature("20°C"), Some(20));
        assert_eq!(parse_temperature("-3 °C"), Some(-3));
        assert_eq!(parse_temperature("warm"), None);
        assert_eq!(parse_percent("30%"), Some(30));
        assert_eq!(parse_percent("130%"), None);
    }

    #[test]
    fn parses_rainfall_amounts_and_ranges() {
        assert_eq!(parse_rainfall("5 mm"), Some(Rainfall::Amount(5.0)));
        assert_eq!(
            parse_rainfall("0 to 2 mm"),
            Some(Rainfall::Range {
                low: 0.0,
                high: 2.0
            })
        );
        assert_eq!(parse_rainfall("4 to 1 mm"), None);
        assert_eq!(parse_rainfall("-1 mm"), None);
        assert_eq!(parse_rainfall("lots"), None);
    }

    #[test]
    fn capitalizes_location_words() {
        assert_eq!(capitalize_words("sydney"), "Sydney");
        assert_eq!(capitalize_words("SYDNEY"), "Sydney");
        assert_eq!(capitalize_words("gold_coast"), "Gold Coast");
        assert_eq!(capitalize_words("  alice  springs "), "Alice Springs");
    }
}
