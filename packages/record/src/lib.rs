#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical record construction.
//!
//! [`RecordBuilder`] turns one ordered set of raw field texts into a
//! [`Forecast`](fieldscrape_record_models::Forecast) or
//! [`Movie`](fieldscrape_record_models::Movie). It is the only place the
//! shared normalization rules in [`normalize`] are applied, so rows read
//! from a file and units scraped from a page go through identical unit
//! stripping, date parsing, and sentinel handling.

pub mod builder;
pub mod diagnostics;
pub mod normalize;

pub use builder::RecordBuilder;

/// Errors raised while building a single record.
///
/// None of these are fatal to a run: the offending record is dropped and
/// reported, and processing continues with the next unit or line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The number of values does not match the record's arity.
    #[error("expected {expected} fields, found {found}")]
    Arity {
        /// Arity of the record kind.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },

    /// The identity field was blank or the sentinel.
    #[error("identity field '{field}' is empty")]
    EmptyIdentity {
        /// Column name of the identity field.
        field: &'static str,
    },

    /// A field's text could not be converted to its typed value.
    #[error("cannot convert {field} value {raw:?}: {reason}")]
    Conversion {
        /// Column name of the field.
        field: &'static str,
        /// The offending raw input.
        raw: String,
        /// Why conversion failed.
        reason: String,
    },
}
